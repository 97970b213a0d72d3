//! 文本处理工具
//!
//! `<think>…</think>` 片段剥离与字符安全截断。

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("think 正则必定合法"));

/// 剥离 `<think>…</think>` 片段并去除首尾空白
///
/// 只移除闭合的片段；未闭合的 `<think>` 原样保留（relay 层负责在流
/// 结束时合成闭合标记，正常情况下落盘内容不会出现未闭合片段）。
pub fn strip_think(text: &str) -> String {
    THINK_RE.replace_all(text, "").trim().to_string()
}

/// 安全截断字符串到指定字符数，避免 UTF-8 边界问题
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        s.to_string()
    } else {
        chars[..max_chars].iter().collect()
    }
}

/// 历史列表用的预览：剥离 think 后截取前 `max_chars` 字符并加省略号
pub fn preview(text: &str, max_chars: usize) -> String {
    let clean = strip_think(text);
    if clean.chars().count() <= max_chars {
        clean
    } else {
        format!("{}...", safe_truncate(&clean, max_chars))
    }
}
