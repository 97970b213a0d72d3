//! 报告读写
//!
//! 保存时统一剥离 `<think>` 片段再落盘，读取方不需要再处理思考内容。
//! 所有写入都是整文件覆盖，没有并发追加的场景。

use crate::error::StoreError;
use chrono::{NaiveDate, Utc};
use reportflow_core::date::{daily_file_name, week_number, week_segments, weekday_long_cn};
use reportflow_core::models::{DailyReport, ReportStyle, WeeklyReport};
use reportflow_core::text::strip_think;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 数据目录上的报告存储
#[derive(Debug, Clone)]
pub struct ReportStore {
    data_dir: PathBuf,
}

impl ReportStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 日期所属的周目录（`{data}/{YYYY}/{MM}/W{NN}`）
    pub fn week_dir(&self, date: NaiveDate) -> PathBuf {
        let (year, month, week) = week_segments(date);
        self.data_dir.join(year).join(month).join(week)
    }

    /// 日报文件路径（`{周目录}/daily/{MM-DD}.json`）
    pub fn daily_path(&self, date: NaiveDate) -> PathBuf {
        self.week_dir(date).join("daily").join(daily_file_name(date))
    }

    /// 周报文件路径（`{周目录}/weekly.json`）
    pub fn weekly_path(&self, date: NaiveDate) -> PathBuf {
        self.week_dir(date).join("weekly.json")
    }

    pub fn daily_exists(&self, date: NaiveDate) -> bool {
        self.daily_path(date).exists()
    }

    pub fn weekly_exists(&self, date: NaiveDate) -> bool {
        self.weekly_path(date).exists()
    }

    /// 保存日报，返回落盘路径
    pub fn save_daily(
        &self,
        date: NaiveDate,
        raw_content: &str,
        generated_report: &str,
        style: ReportStyle,
    ) -> Result<PathBuf, StoreError> {
        let path = self.daily_path(date);
        let report = DailyReport {
            date: date.format("%Y-%m-%d").to_string(),
            weekday: weekday_long_cn(date).to_string(),
            raw_content: raw_content.to_string(),
            generated_report: strip_think(generated_report),
            style,
            created_at: Utc::now().to_rfc3339(),
        };
        self.write_json(&path, &report)?;
        debug!("日报已保存: {}", path.display());
        Ok(path)
    }

    /// 保存周报（同一周重复保存会覆盖），返回落盘路径
    pub fn save_weekly(
        &self,
        date: NaiveDate,
        generated_report: &str,
        style: ReportStyle,
    ) -> Result<PathBuf, StoreError> {
        let path = self.weekly_path(date);
        let report = WeeklyReport {
            week_number: week_number(date),
            generated_report: strip_think(generated_report),
            style,
            created_at: Utc::now().to_rfc3339(),
        };
        self.write_json(&path, &report)?;
        debug!("周报已保存: {}", path.display());
        Ok(path)
    }

    /// 读取某日所在周的全部日报，按日期升序
    ///
    /// 周目录不存在时返回空列表；无法解析的文件跳过。
    pub fn week_dailies(&self, date: NaiveDate) -> Result<Vec<DailyReport>, StoreError> {
        let daily_dir = self.week_dir(date).join("daily");
        if !daily_dir.exists() {
            return Ok(Vec::new());
        }

        let mut dailies = Vec::new();
        for entry in fs::read_dir(&daily_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|s| serde_json::from_str::<DailyReport>(&s).map_err(StoreError::from))
            {
                Ok(report) => dailies.push(report),
                Err(e) => debug!("跳过无法解析的日报文件 {}: {e}", path.display()),
            }
        }
        dailies.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(dailies)
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_path_layout() {
        let store = ReportStore::new("data");
        assert_eq!(
            store.daily_path(d("2024-03-11")),
            PathBuf::from("data/2024/03/W11/daily/03-11.json")
        );
        // 年末：日历年月 + 跨年 ISO 周号
        assert_eq!(
            store.weekly_path(d("2024-12-30")),
            PathBuf::from("data/2024/12/W01/weekly.json")
        );
    }

    #[test]
    fn test_save_daily_strips_think_and_fills_weekday() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(dir.path());

        let path = store
            .save_daily(
                d("2024-03-11"),
                "修了一个 bug",
                "<think>想一想</think>### 一、今日工作明细",
                ReportStyle::Formal,
            )
            .unwrap();

        assert!(store.daily_exists(d("2024-03-11")));
        let saved: DailyReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.date, "2024-03-11");
        assert_eq!(saved.weekday, "星期一");
        assert_eq!(saved.generated_report, "### 一、今日工作明细");
        assert!(!saved.created_at.is_empty());
    }

    #[test]
    fn test_save_weekly_overwrites() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        let date = d("2024-03-13");

        store.save_weekly(date, "第一版", ReportStyle::Tech).unwrap();
        let path = store.save_weekly(date, "第二版", ReportStyle::Tech).unwrap();

        assert!(store.weekly_exists(date));
        let saved: WeeklyReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.week_number, 11);
        assert_eq!(saved.generated_report, "第二版");
    }

    #[test]
    fn test_week_dailies_sorted_ascending() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(dir.path());

        store
            .save_daily(d("2024-03-13"), "c", "周三的报告", ReportStyle::Formal)
            .unwrap();
        store
            .save_daily(d("2024-03-11"), "a", "周一的报告", ReportStyle::Formal)
            .unwrap();
        store
            .save_daily(d("2024-03-12"), "b", "周二的报告", ReportStyle::Formal)
            .unwrap();

        let dailies = store.week_dailies(d("2024-03-15")).unwrap();
        let dates: Vec<_> = dailies.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-11", "2024-03-12", "2024-03-13"]);
    }

    #[test]
    fn test_week_dailies_missing_dir_and_bad_file() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(dir.path());

        assert!(store.week_dailies(d("2024-03-11")).unwrap().is_empty());

        store
            .save_daily(d("2024-03-11"), "a", "正常报告", ReportStyle::Formal)
            .unwrap();
        let daily_dir = store.week_dir(d("2024-03-11")).join("daily");
        fs::write(daily_dir.join("03-99.json"), "{broken").unwrap();

        let dailies = store.week_dailies(d("2024-03-11")).unwrap();
        assert_eq!(dailies.len(), 1);
    }
}
