//! 共享应用状态

use reportflow_config::Config;
use reportflow_storage::ReportStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 各 handler 共享的应用状态
///
/// 配置可经 `/api/config` 在运行期修改，放在读写锁后面；数据目录在
/// 启动时定死，运行期不跟随配置变化。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// 配置落盘路径
    pub config_path: PathBuf,
    pub store: ReportStore,
    /// 上游请求共享的连接池
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        let store = ReportStore::new(&config.server.data_dir);
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            store,
            http: reqwest::Client::new(),
        }
    }
}
