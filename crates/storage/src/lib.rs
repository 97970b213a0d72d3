//! 报告文件存储
//!
//! 报告以 JSON 文件形式落在数据目录下，按周分桶：
//!
//! ```text
//! data/
//!   {YYYY}/{MM}/W{NN}/
//!     daily/{MM-DD}.json    日报，一天一个文件
//!     weekly.json           周报，一周一个文件（覆盖写）
//! ```
//!
//! 不引数据库，文件即数据。历史查询每次全量扫描数据目录，个人
//! 报告体量下足够快。

pub mod error;
pub mod history;
pub mod store;

pub use error::StoreError;
pub use history::HistoryQuery;
pub use store::ReportStore;
