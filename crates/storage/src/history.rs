//! 历史查询
//!
//! 递归扫描数据目录下的全部 `.json` 报告文件（跳过 `config.json`），
//! 按内容结构判定类型：带 `weekNumber` 字段的是周报，其余是日报。
//! 过滤、按日期倒序排序后分页返回。

use crate::error::StoreError;
use crate::store::ReportStore;
use reportflow_core::models::{HistoryItem, HistoryPage, ReportKind};
use reportflow_core::text::preview;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 历史列表预览长度（字符数）
const PREVIEW_CHARS: usize = 100;

/// 历史查询条件
///
/// `kind` 为 `None` 表示不按类型过滤；日期区间是闭区间，按
/// `YYYY-MM-DD` 字符串比较。
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    /// 页码，从 1 开始
    pub page: usize,
    /// 每页条数
    pub limit: usize,
    pub kind: Option<ReportKind>,
    pub keyword: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            kind: None,
            keyword: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl ReportStore {
    /// 扫描数据目录并返回符合条件的历史分页
    pub fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, StoreError> {
        let mut items = Vec::new();

        if self.data_dir().exists() {
            let mut files = Vec::new();
            collect_report_files(self.data_dir(), &mut files)?;

            for path in files {
                match load_history_item(&path) {
                    Ok(item) => {
                        if matches(&item, query) {
                            items.push(item);
                        }
                    }
                    Err(e) => debug!("跳过无法解析的报告文件 {}: {e}", path.display()),
                }
            }
        }

        items.sort_by(|a, b| b.date.cmp(&a.date));

        let total = items.len();
        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let total_pages = total.div_ceil(limit);
        let items = items
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(HistoryPage {
            items,
            total,
            page,
            total_pages,
        })
    }
}

fn collect_report_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_report_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json")
            && path.file_name().and_then(|n| n.to_str()) != Some("config.json")
        {
            out.push(path);
        }
    }
    Ok(())
}

fn load_history_item(path: &Path) -> Result<HistoryItem, StoreError> {
    let content: Value = serde_json::from_str(&fs::read_to_string(path)?)?;

    let week_number = content
        .get("weekNumber")
        .and_then(|v| v.as_u64())
        .map(|n| n as u32);
    let kind = if week_number.is_some() {
        ReportKind::Weekly
    } else {
        ReportKind::Daily
    };

    // 日报有 date 字段；周报取 createdAt 的日期部分
    let date = content
        .get("date")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| {
            content
                .get("createdAt")
                .and_then(|v| v.as_str())
                .and_then(|s| s.split('T').next())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let full_content = content
        .get("generatedReport")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(HistoryItem {
        kind,
        date,
        weekday: content
            .get("weekday")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        week_number,
        preview: preview(&full_content, PREVIEW_CHARS),
        full_content,
        file_path: path.display().to_string(),
    })
}

fn matches(item: &HistoryItem, query: &HistoryQuery) -> bool {
    if let Some(kind) = query.kind {
        if item.kind != kind {
            return false;
        }
    }
    if let Some(start) = &query.start_date {
        if item.date.as_str() < start.as_str() {
            return false;
        }
    }
    if let Some(end) = &query.end_date {
        if item.date.as_str() > end.as_str() {
            return false;
        }
    }
    if let Some(keyword) = &query.keyword {
        if !keyword.is_empty() {
            let needle = keyword.to_lowercase();
            let haystack =
                format!("{} {} {}", item.date, item.weekday, item.full_content).to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
    }
    true
}
