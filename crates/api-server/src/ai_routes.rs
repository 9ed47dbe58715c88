//! Market summaries from the configured analyzer (ScoutGPT or rules), plus
//! the in-memory history of ScoutGPT calls.
//!
//! Context and properties travel in the request body; only the call log is
//! kept between requests.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use property_analyzer::validate_record;
use property_core::{AnalysisContext, MarketSummary, PropertyRecord, SignalSet};
use scout_client::{CallRecord, CallStatistics};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::property_routes::{check_batch_size, json_body, request_context};
use crate::request_id::RequestId;
use crate::{ApiResponse, AppError, AppState};

pub const DEFAULT_LOG_LIMIT: usize = 100;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AiSummaryRequest {
    /// Unreadable or empty entries are skipped
    #[schema(value_type = Vec<Option<PropertyRecord>>)]
    pub properties: Vec<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: AnalysisContext,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LogQuery {
    /// Only calls that covered this single property
    pub property_id: Option<String>,
    /// Defaults to 100
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    /// Newest first
    pub logs: Vec<CallRecord>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    /// False when ScoutGPT is not the configured analyzer
    pub enabled: bool,
    pub statistics: CallStatistics,
    pub timestamp: DateTime<Utc>,
}

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai-summary", post(ai_summary))
        .route("/api/ai-logs", get(ai_logs))
        .route("/api/ai-statistics", get(ai_statistics))
}

#[utoipa::path(
    post,
    path = "/api/ai-summary",
    request_body = AiSummaryRequest,
    responses(
        (status = 200, description = "Market summary; falls back to rule-based text when ScoutGPT is unavailable", body = MarketSummary),
        (status = 413, description = "Batch exceeds MAX_BATCH_SIZE")
    ),
    tag = "AI"
)]
async fn ai_summary(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<AiSummaryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MarketSummary>>, AppError> {
    let request = json_body(payload)?;
    check_batch_size(&state, request.properties.len())?;

    let submitted = request.properties.len();
    let context = request_context(request.context, request_id);

    let computer = state.signal_computer();
    let records: Vec<PropertyRecord> = request
        .properties
        .into_iter()
        .filter_map(|entry| PropertyRecord::from_json(entry).ok().flatten())
        .collect();
    let signals: Vec<SignalSet> = records
        .iter()
        .filter_map(|r| validate_record(Some(r)).ok())
        .map(|r| computer.compute(r))
        .collect();

    let skipped = submitted - signals.len();
    if skipped > 0 {
        tracing::info!(skipped, "Skipping records without usable data");
    }

    let summary = state
        .analyzer
        .summarize(&context, &signals)
        .await
        .map_err(|e| {
            AppError::with_status(
                StatusCode::BAD_GATEWAY,
                anyhow::anyhow!("Market summary failed: {e}"),
            )
        })?;

    tracing::info!(
        county = context.county.as_deref().unwrap_or("-"),
        request_id = context.request_id().unwrap_or("-"),
        properties = summary.properties_analyzed,
        analyzer = %summary.analyzer,
        "Market summary generated"
    );

    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/ai-logs",
    params(LogQuery),
    responses((status = 200, description = "Recent ScoutGPT calls, newest first; empty when the rule engine is active")),
    tag = "AI"
)]
async fn ai_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Json<ApiResponse<LogsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let logs = match &state.call_log {
        Some(log) => log.recent(query.property_id.as_deref(), limit).await,
        None => Vec::new(),
    };

    Json(ApiResponse::success(LogsResponse {
        count: logs.len(),
        logs,
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/ai-statistics",
    responses((status = 200, description = "Aggregate counts and timings over the retained ScoutGPT calls")),
    tag = "AI"
)]
async fn ai_statistics(State(state): State<AppState>) -> Json<ApiResponse<StatisticsResponse>> {
    let statistics = match &state.call_log {
        Some(log) => log.statistics().await,
        None => CallStatistics::default(),
    };

    Json(ApiResponse::success(StatisticsResponse {
        enabled: state.call_log.is_some(),
        statistics,
        timestamp: Utc::now(),
    }))
}
