//! Property signal and analysis endpoints.

use std::cmp::Ordering;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use property_analyzer::{MarketAggregator, RecordAnalysis, RuleBasedAnalyzer};
use property_core::{AnalysisContext, MarketSummary, PropertyRecord, SignalSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request_id::RequestId;
use crate::{ApiResponse, AppError, AppState};

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 20;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BatchRequest {
    /// `null` or unreadable entries are reported as insufficient data
    #[schema(value_type = Vec<Option<PropertyRecord>>)]
    pub properties: Vec<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: AnalysisContext,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<RecordAnalysis>,
    pub market: MarketSummary,
    pub context: AnalysisContext,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RecommendationRequest {
    #[schema(value_type = Vec<Option<PropertyRecord>>)]
    pub properties: Vec<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: AnalysisContext,
    /// Defaults to 20
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// Best first
    pub recommendations: Vec<RecordAnalysis>,
    pub analyzed: usize,
    pub insufficient: usize,
    pub context: AnalysisContext,
}

pub fn property_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signals", post(compute_signals))
        .route("/api/analyze", post(analyze_property))
        .route("/api/analyze/batch", post(analyze_batch))
        .route("/api/recommendations", post(recommendations))
}

/// Unwrap a JSON body, turning axum's plain-text rejection into our envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(format!("Invalid request body: {}", rejection.body_text())))
}

pub(crate) fn check_batch_size(state: &AppState, len: usize) -> Result<(), AppError> {
    let max = state.config.max_batch_size;
    if len > max {
        return Err(AppError::with_status(
            StatusCode::PAYLOAD_TOO_LARGE,
            anyhow::anyhow!("Batch of {len} properties exceeds the limit of {max}"),
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/signals",
    request_body = PropertyRecord,
    responses(
        (status = 200, description = "Derived signals for the record", body = SignalSet),
        (status = 400, description = "Body is not a property record")
    ),
    tag = "Properties"
)]
async fn compute_signals(
    State(state): State<AppState>,
    payload: Result<Json<PropertyRecord>, JsonRejection>,
) -> Result<Json<ApiResponse<SignalSet>>, AppError> {
    let record = json_body(payload)?;
    let signals = state.signal_computer().compute(&record);
    Ok(Json(ApiResponse::success(signals)))
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content = PropertyRecord, description = "Property record, or null"),
    responses(
        (status = 200, description = "Signals and analysis; null, empty or unreadable records yield an insufficient-data result"),
        (status = 400, description = "Body is not valid JSON")
    ),
    tag = "Properties"
)]
async fn analyze_property(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<RecordAnalysis>>, AppError> {
    let record = json_body(payload)?;
    let context = AnalysisContext::default().with_request_id(request_id);
    let outcome = state.analyze_value(&context, record).await;

    tracing::info!(
        property_id = %outcome.analysis.property_id,
        classification = %outcome.analysis.classification,
        score = outcome.analysis.investment_score,
        analyzer = %outcome.analysis.analyzer,
        "Property analyzed"
    );

    Ok(Json(ApiResponse::success(outcome)))
}

/// Analyze every entry in order under one context.
async fn analyze_entries(state: &AppState, context: &AnalysisContext, entries: Vec<Value>) -> Vec<RecordAnalysis> {
    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        results.push(state.analyze_value(context, entry).await);
    }
    results
}

/// Request body context plus the id of the HTTP request carrying it.
pub(crate) fn request_context(context: AnalysisContext, request_id: String) -> AnalysisContext {
    if context.request_id().is_some() {
        return context;
    }
    context.with_request_id(request_id)
}

#[utoipa::path(
    post,
    path = "/api/analyze/batch",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Per-property results plus a market summary"),
        (status = 413, description = "Batch exceeds MAX_BATCH_SIZE")
    ),
    tag = "Properties"
)]
async fn analyze_batch(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchResponse>>, AppError> {
    let request = json_body(payload)?;
    check_batch_size(&state, request.properties.len())?;

    let context = request_context(request.context, request_id);
    let results = analyze_entries(&state, &context, request.properties).await;

    // Insufficient records carry no signals and stay out of the aggregates
    let scored: Vec<(SignalSet, property_core::AnalysisResult)> = results
        .iter()
        .filter_map(|r| r.signals.clone().map(|s| (s, r.analysis.clone())))
        .collect();
    let market = MarketAggregator::new().summarize(&scored, RuleBasedAnalyzer::NAME);

    tracing::info!(
        county = context.county.as_deref().unwrap_or("-"),
        request_id = context.request_id().unwrap_or("-"),
        submitted = results.len(),
        scored = scored.len(),
        sentiment = market.sentiment.as_str(),
        "Batch analyzed"
    );

    Ok(Json(ApiResponse::success(BatchResponse {
        results,
        market,
        context,
    })))
}

/// Highest score first; confidence then id break ties so the order is stable.
fn rank(a: &RecordAnalysis, b: &RecordAnalysis) -> Ordering {
    b.analysis
        .investment_score
        .cmp(&a.analysis.investment_score)
        .then_with(|| {
            b.analysis
                .confidence
                .partial_cmp(&a.analysis.confidence)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.analysis.property_id.cmp(&b.analysis.property_id))
}

#[utoipa::path(
    post,
    path = "/api/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Scored properties ranked best first; insufficient records are left out"),
        (status = 400, description = "max_results is zero"),
        (status = 413, description = "Batch exceeds MAX_BATCH_SIZE")
    ),
    tag = "Properties"
)]
async fn recommendations(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RecommendationResponse>>, AppError> {
    let request = json_body(payload)?;
    check_batch_size(&state, request.properties.len())?;
    let max_results = request.max_results.unwrap_or(DEFAULT_MAX_RECOMMENDATIONS);
    if max_results == 0 {
        return Err(AppError::bad_request("max_results must be greater than zero"));
    }

    let context = request_context(request.context, request_id);
    let results = analyze_entries(&state, &context, request.properties).await;
    let analyzed = results.len();

    let mut ranked: Vec<RecordAnalysis> = results
        .into_iter()
        .filter(|r| !r.analysis.is_insufficient())
        .collect();
    let insufficient = analyzed - ranked.len();
    ranked.sort_by(rank);
    ranked.truncate(max_results);

    tracing::info!(
        county = context.county.as_deref().unwrap_or("-"),
        analyzed,
        insufficient,
        returned = ranked.len(),
        "Recommendations ranked"
    );

    Ok(Json(ApiResponse::success(RecommendationResponse {
        recommendations: ranked,
        analyzed,
        insufficient,
        context,
    })))
}
