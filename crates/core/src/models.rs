//! 报告数据模型
//!
//! 定义日报、周报与历史条目的落盘/接口结构。
//!
//! ## 主要类型
//! - `DailyReport` - 单日日报文件内容
//! - `WeeklyReport` - 周报文件内容
//! - `ReportStyle` - 报告语气风格
//! - `HistoryItem` / `HistoryPage` - 历史查询结果
//!
//! 落盘与 API 均使用 camelCase 字段名，与既有 JSON 数据布局保持一致。

use serde::{Deserialize, Serialize};

/// 报告语气风格
///
/// 未知取值按 `Formal` 处理（与原有数据中的自由字符串兼容）。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ReportStyle {
    /// 轻松专业
    Casual,
    /// 严谨技术向
    Tech,
    /// 正式得体
    #[default]
    Formal,
}

impl From<String> for ReportStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "casual" => Self::Casual,
            "tech" => Self::Tech,
            _ => Self::Formal,
        }
    }
}

/// 单日日报
///
/// 存放于 `data/{YYYY}/{MM}/W{NN}/daily/{MM-DD}.json`。
/// `generated_report` 在保存时已剥离 `<think>` 片段。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    /// 报告日期（YYYY-MM-DD）
    pub date: String,
    /// 中文星期（如"星期一"）
    pub weekday: String,
    /// 用户原始输入
    pub raw_content: String,
    /// 生成的日报正文
    pub generated_report: String,
    /// 语气风格
    #[serde(default)]
    pub style: ReportStyle,
    /// 创建时间（RFC 3339）
    pub created_at: String,
}

/// 周报
///
/// 存放于 `data/{YYYY}/{MM}/W{NN}/weekly.json`。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// ISO 周号
    pub week_number: u32,
    /// 生成的周报正文
    pub generated_report: String,
    /// 语气风格
    #[serde(default)]
    pub style: ReportStyle,
    /// 创建时间（RFC 3339）
    pub created_at: String,
}

/// 报告类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Weekly,
}

/// 历史查询条目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// 报告类型
    #[serde(rename = "type")]
    pub kind: ReportKind,
    /// 报告日期（周报取 createdAt 的日期部分）
    pub date: String,
    /// 中文星期（周报为空）
    #[serde(default)]
    pub weekday: String,
    /// ISO 周号（仅周报）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u32>,
    /// 剥离 think 后的前 100 字符预览
    pub preview: String,
    /// 完整正文
    pub full_content: String,
    /// 来源文件路径
    pub file_path: String,
}

/// 历史查询分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub items: Vec<HistoryItem>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}
