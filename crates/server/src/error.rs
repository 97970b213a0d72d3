//! API 错误
//!
//! 统一响应体 `{"success": false, "error": "..."}`。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// handler 层错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("AI provider 尚未配置")]
    AiNotConfigured,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] reportflow_storage::StoreError),

    #[error(transparent)]
    Config(#[from] reportflow_config::ConfigError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AiNotConfigured | Self::Store(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
