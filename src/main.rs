//! ReportFlow 服务入口
//!
//! 加载配置、初始化日志，然后起 HTTP 服务。配置文件路径可用
//! `REPORTFLOW_CONFIG` 环境变量覆盖。

use reportflow_config::{default_config_path, load_config};
use reportflow_server::{build_router, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var_os("REPORTFLOW_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    tracing::info!("配置文件: {}", config_path.display());
    let config = load_config(&config_path)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, config_path);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ReportFlow 服务已启动: http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
