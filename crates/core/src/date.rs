//! 周分桶与中文日期格式化
//!
//! 报告按 `data/{YYYY}/{MM}/W{NN}/` 分桶：年、月取日历值，周号取
//! ISO-8601 周号。年末日期可能出现 `2024/12/W01` 这样的组合，这是既有
//! 数据布局的一部分，保持不变。

use chrono::{Datelike, NaiveDate, Weekday};

/// ISO-8601 周号（1..=53）
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// 周目录的三段路径（年、月、周），如 `("2024", "03", "W11")`
pub fn week_segments(date: NaiveDate) -> (String, String, String) {
    (
        format!("{:04}", date.year()),
        format!("{:02}", date.month()),
        format!("W{:02}", week_number(date)),
    )
}

/// 日报文件名（`MM-DD.json`）
pub fn daily_file_name(date: NaiveDate) -> String {
    format!("{:02}-{:02}.json", date.month(), date.day())
}

/// 中文星期全称（"星期一"…"星期日"）
pub fn weekday_long_cn(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "星期一",
        Weekday::Tue => "星期二",
        Weekday::Wed => "星期三",
        Weekday::Thu => "星期四",
        Weekday::Fri => "星期五",
        Weekday::Sat => "星期六",
        Weekday::Sun => "星期日",
    }
}

/// 中文星期简称（"周一"…"周日"）
pub fn weekday_short_cn(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "周一",
        Weekday::Tue => "周二",
        Weekday::Wed => "周三",
        Weekday::Thu => "周四",
        Weekday::Fri => "周五",
        Weekday::Sat => "周六",
        Weekday::Sun => "周日",
    }
}

/// 中文短日期（"3月11日"）
pub fn date_cn(date: NaiveDate) -> String {
    format!("{}月{}日", date.month(), date.day())
}
