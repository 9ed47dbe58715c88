use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use property_core::{
    AnalysisResult, Classification, ClassificationBreakdown, DataIssue, DataStatus, FloodRisk,
    MarketSentiment, MarketSummary, OwnershipType, PropertyRecord, RawField, RiskLevel,
    ScoreBreakdown, SignalSet, ValuationBand, ValuationRange,
};

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ScoutIQ Property Intelligence API",
        description = "Signal derivation, rule-based scoring and market summaries for property records"
    ),
    paths(
        crate::health,
        crate::property_routes::compute_signals,
        crate::property_routes::analyze_property,
        crate::property_routes::analyze_batch,
        crate::property_routes::recommendations,
        crate::ai_routes::ai_summary,
        crate::ai_routes::ai_logs,
        crate::ai_routes::ai_statistics,
    ),
    components(schemas(
        PropertyRecord,
        RawField,
        SignalSet,
        ValuationBand,
        OwnershipType,
        FloodRisk,
        DataIssue,
        AnalysisResult,
        Classification,
        RiskLevel,
        DataStatus,
        ScoreBreakdown,
        MarketSummary,
        MarketSentiment,
        ClassificationBreakdown,
        ValuationRange,
        crate::HealthResponse,
        crate::property_routes::BatchRequest,
        crate::property_routes::RecommendationRequest,
        crate::ai_routes::AiSummaryRequest,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Properties", description = "Signals and per-property analysis"),
        (name = "AI", description = "Market summaries and ScoutGPT call history")
    )
)]
pub struct ApiDoc;

pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/api/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
