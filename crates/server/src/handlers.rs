//! 请求处理
//!
//! 生成类接口（generate-daily / generate-weekly）返回 SSE 流，其余
//! 接口返回普通 JSON。保存与生成是两步：前端先流式拿到报告，用户
//! 确认后再调保存接口落盘。

use crate::error::ApiError;
use crate::prompts;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use futures::{Stream, StreamExt};
use reportflow_config::{AiConfig, AiConfigUpdate};
use reportflow_core::models::{ReportKind, ReportStyle};
use reportflow_providers::{relay_stream, NormalizedEvent, ProviderConfig, ProviderKind};
use reportflow_storage::HistoryQuery;
use serde::Deserialize;
use std::time::Duration;

fn provider_config(ai: &AiConfig) -> ProviderConfig {
    ProviderConfig {
        kind: ProviderKind::from_provider_name(&ai.provider),
        base_url: ai.base_url.clone(),
        api_key: ai.api_key.clone(),
        model: ai.model.clone(),
        idle_timeout: ai.idle_timeout_secs.map(Duration::from_secs),
    }
}

/// 把归一化事件流包装成 SSE 响应
fn sse_response(
    events: impl Stream<Item = NormalizedEvent> + Send + 'static,
) -> Response {
    let body = Body::from_stream(
        events.map(|event| Ok::<_, std::convert::Infallible>(event.to_sse())),
    );
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(body)
        .unwrap_or_else(|e| {
            tracing::error!("构建 SSE 响应失败: {e}");
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .unwrap_or_default()
        })
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("日期格式无效: {s}，应为 YYYY-MM-DD")))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---- 配置 ----

pub async fn get_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config.read().await;
    Json(config.masked_ai())
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<AiConfigUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut config = state.config.write().await;
    config.apply_update(update);
    reportflow_config::save_config(&state.config_path, &config)?;
    tracing::info!("AI 配置已更新");
    Ok(Json(serde_json::json!({ "success": true })))
}

// ---- 生成 ----

#[derive(Debug, Deserialize)]
pub struct GenerateDailyRequest {
    pub content: String,
    #[serde(default)]
    pub style: ReportStyle,
}

pub async fn generate_daily(
    State(state): State<AppState>,
    Json(req): Json<GenerateDailyRequest>,
) -> Result<Response, ApiError> {
    let ai = state
        .config
        .read()
        .await
        .ai
        .clone()
        .ok_or(ApiError::AiNotConfigured)?;

    let system_prompt = prompts::daily_system_prompt(today(), req.style);
    let events = relay_stream(
        state.http.clone(),
        provider_config(&ai),
        system_prompt,
        req.content,
    );
    Ok(sse_response(events))
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateWeeklyRequest {
    #[serde(default)]
    pub style: ReportStyle,
}

pub async fn generate_weekly(
    State(state): State<AppState>,
    Json(_req): Json<GenerateWeeklyRequest>,
) -> Result<Response, ApiError> {
    let ai = state
        .config
        .read()
        .await
        .ai
        .clone()
        .ok_or(ApiError::AiNotConfigured)?;

    let dailies = state.store.week_dailies(today())?;
    if dailies.is_empty() {
        return Err(ApiError::BadRequest("本周没有可用的日报".to_string()));
    }

    let system_prompt = prompts::weekly_system_prompt(today());
    let user_input = prompts::weekly_user_input(&dailies);
    let events = relay_stream(
        state.http.clone(),
        provider_config(&ai),
        system_prompt,
        user_input,
    );
    Ok(sse_response(events))
}

// ---- 保存 ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDailyRequest {
    pub date: String,
    #[serde(default)]
    pub raw_content: String,
    pub generated_report: String,
    #[serde(default)]
    pub style: ReportStyle,
}

pub async fn save_daily(
    State(state): State<AppState>,
    Json(req): Json<SaveDailyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = parse_date(&req.date)?;
    let path = state
        .store
        .save_daily(date, &req.raw_content, &req.generated_report, req.style)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "path": path.display().to_string(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWeeklyRequest {
    pub generated_report: String,
    #[serde(default)]
    pub style: ReportStyle,
}

pub async fn save_weekly(
    State(state): State<AppState>,
    Json(req): Json<SaveWeeklyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = state
        .store
        .save_weekly(today(), &req.generated_report, req.style)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "path": path.display().to_string(),
    })))
}

// ---- 查询 ----

#[derive(Debug, Deserialize)]
pub struct CheckExistsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
}

pub async fn check_exists(
    State(state): State<AppState>,
    Query(query): Query<CheckExistsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = match &query.date {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let exists = match query.kind.as_deref() {
        Some("daily") => state.store.daily_exists(date),
        Some("weekly") => state.store.weekly_exists(date),
        _ => false,
    };
    Ok(Json(serde_json::json!({ "exists": exists })))
}

pub async fn current_week_dailies(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut dailies = state.store.week_dailies(today())?;
    // 列表展示最新在前
    dailies.reverse();
    Ok(Json(serde_json::json!({ "dailies": dailies })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub keyword: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = match params.kind.as_deref() {
        Some("daily") => Some(ReportKind::Daily),
        Some("weekly") => Some(ReportKind::Weekly),
        _ => None,
    };
    let query = HistoryQuery {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(10),
        kind,
        keyword: params.keyword,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let page = state.store.history(&query)?;
    Ok(Json(serde_json::to_value(page).map_err(
        reportflow_storage::StoreError::from,
    )?))
}

// ---- 健康检查 ----

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
