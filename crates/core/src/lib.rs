//! 核心类型和工具模块
//!
//! 包含 models（报告数据模型）、date（周分桶与中文日期格式化）、
//! text（think 片段剥离）等基础功能。

pub mod date;
pub mod models;
pub mod text;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
