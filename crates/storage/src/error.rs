//! 存储层错误

use thiserror::Error;

/// 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("文件 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}
