//! HTTP API 服务器
//!
//! 路由、请求处理、提示词模板与流式响应编码。配置与报告的读写
//! 分别委托给 `reportflow-config` 和 `reportflow-storage`，流式
//! 中继委托给 `reportflow-providers`。

pub mod error;
pub mod handlers;
pub mod prompts;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
