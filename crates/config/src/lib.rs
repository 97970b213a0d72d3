//! 配置模块
//!
//! 配置文件位于 `{config_dir}/reportflow/config.json`（可通过显式路径
//! 覆盖，便于测试与部署）。负责：
//! - 读取/保存配置（文件不存在时返回默认值）
//! - legacy `deepseek` 顶层键到 `ai` 键的迁移
//! - API 用的脱敏视图（不回传 apiKey）
//! - 部分更新语义（空 apiKey 不覆盖已存的密钥）

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// 配置读写错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置文件 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析错误
    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// AI Provider 配置；未配置时生成接口直接报错
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiConfig>,
    /// legacy 配置键，仅用于加载时迁移，不再写回
    #[serde(default, skip_serializing)]
    deepseek: Option<LegacyDeepseekConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 报告数据根目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// AI Provider 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// provider 名称：deepseek / openai / anthropic / antigravity …
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// 上游相邻 chunk 之间的空闲超时（秒），默认不限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
}

/// legacy 配置（早期版本把 DeepSeek 配置放在顶层 `deepseek` 键下）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyDeepseekConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_model")]
    model: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            idle_timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ai: None,
            deepseek: None,
        }
    }
}

impl Config {
    /// 脱敏视图：provider/baseUrl/model + hasApiKey，不含密钥本身
    pub fn masked_ai(&self) -> serde_json::Value {
        let ai = self.ai.clone().unwrap_or_default();
        serde_json::json!({
            "ai": {
                "provider": ai.provider,
                "baseUrl": ai.base_url,
                "model": ai.model,
                "hasApiKey": !ai.api_key.is_empty(),
            }
        })
    }

    /// 应用部分更新：仅非空字段覆盖，空 apiKey 保留已存密钥
    pub fn apply_update(&mut self, update: AiConfigUpdate) {
        let ai = self.ai.get_or_insert_with(AiConfig::default);
        if let Some(provider) = update.provider.filter(|s| !s.is_empty()) {
            ai.provider = provider;
        }
        if let Some(base_url) = update.base_url.filter(|s| !s.is_empty()) {
            ai.base_url = base_url;
        }
        if let Some(model) = update.model.filter(|s| !s.is_empty()) {
            ai.model = model;
        }
        if let Some(api_key) = update.api_key.filter(|s| !s.is_empty()) {
            ai.api_key = api_key;
        }
        if let Some(secs) = update.idle_timeout_secs {
            ai.idle_timeout_secs = (secs > 0).then_some(secs);
        }
    }
}

/// `/api/config` 的部分更新请求体
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfigUpdate {
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub idle_timeout_secs: Option<u64>,
}

/// 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reportflow")
        .join("config.json")
}

/// 从指定路径加载配置
///
/// 文件不存在时返回默认配置；存在但解析失败时返回错误（在启动时
/// 直接暴露，避免悄悄覆盖用户手写的配置）。
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = serde_json::from_str(&content)?;

    // legacy deepseek 键迁移
    if config.ai.is_none() {
        if let Some(legacy) = config.deepseek.take() {
            info!("迁移 legacy deepseek 配置到 ai 键");
            config.ai = Some(AiConfig {
                provider: "deepseek".to_string(),
                base_url: legacy.base_url,
                api_key: legacy.api_key,
                model: legacy.model,
                idle_timeout_secs: None,
            });
        }
    }
    config.deepseek = None;

    Ok(config)
}

/// 保存配置到指定路径（自动创建父目录，pretty JSON）
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
