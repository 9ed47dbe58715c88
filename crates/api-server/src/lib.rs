//! ScoutIQ HTTP API.
//!
//! Thin axum layer over the signal computer and the configured
//! `PropertyAnalyzer`. Every response uses the `{ success, data, error }`
//! envelope.

pub mod ai_routes;
pub mod cache;
pub mod config;
pub mod openapi;
pub mod property_routes;
pub mod request_id;
pub mod security_headers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use property_analyzer::{
    analyze_record, analyze_signals, insufficient_record, validate_record, RecordAnalysis,
    RuleBasedAnalyzer,
};
use property_core::{AnalysisContext, PropertyAnalyzer, PropertyRecord};
use scout_client::{CallLog, ScoutConfig, ScoutGptAnalyzer};
use serde::Serialize;
use signal_computer::SignalComputer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::AnalysisCache;
use crate::config::{AnalyzerMode, ServerConfig};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn PropertyAnalyzer>,
    pub cache: Option<Arc<AnalysisCache>>,
    pub config: Arc<ServerConfig>,
    /// ScoutGPT call history; `None` when the rule engine serves requests
    pub call_log: Option<CallLog>,
    /// Fixed "today" for date arithmetic; `None` uses the current date per request
    reference_date: Option<NaiveDate>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn PropertyAnalyzer>, config: ServerConfig) -> Self {
        let cache = config
            .cache_enabled()
            .then(|| Arc::new(AnalysisCache::new(config.cache_ttl)));
        Self {
            analyzer,
            cache,
            config: Arc::new(config),
            call_log: None,
            reference_date: None,
        }
    }

    pub fn with_call_log(mut self, call_log: CallLog) -> Self {
        self.call_log = Some(call_log);
        self
    }

    pub fn with_reference_date(mut self, as_of: NaiveDate) -> Self {
        self.reference_date = Some(as_of);
        self
    }

    pub fn signal_computer(&self) -> SignalComputer {
        match self.reference_date {
            Some(as_of) => SignalComputer::with_reference_date(as_of),
            None => SignalComputer::new(),
        }
    }

    /// Analyze one record through the cache. Fallback results are never
    /// cached so a recovered ScoutGPT is picked up on the next request.
    pub async fn analyze(
        &self,
        context: &AnalysisContext,
        record: Option<&PropertyRecord>,
    ) -> RecordAnalysis {
        let computer = self.signal_computer();
        let analyzer = self.analyzer.as_ref();

        let valid = match validate_record(record) {
            Ok(valid) => valid,
            Err(_) => return analyze_record(analyzer, &computer, context, record).await,
        };

        let signals = computer.compute(valid);
        if let Some(cache) = &self.cache {
            if let Some(analysis) = cache.get(&signals) {
                tracing::debug!(property_id = %signals.property_id, "Analysis cache hit");
                return RecordAnalysis {
                    signals: Some(signals),
                    analysis,
                };
            }
        }

        let analysis = analyze_signals(analyzer, context, &signals).await;
        if let Some(cache) = &self.cache {
            if analysis.analyzer == analyzer.name() {
                cache.insert(&signals, &analysis);
            }
        }

        RecordAnalysis {
            signals: Some(signals),
            analysis,
        }
    }

    /// Analyze an untyped JSON entry. Entries that do not decode as a
    /// property record get the insufficient-data result.
    pub async fn analyze_value(&self, context: &AnalysisContext, value: serde_json::Value) -> RecordAnalysis {
        let property_id = PropertyRecord::id_hint(&value);
        match PropertyRecord::from_json(value) {
            Ok(record) => self.analyze(context, record.as_ref()).await,
            Err(e) => insufficient_record(&property_id, &e, self.analyzer.name()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error: an `anyhow::Error` plus the status to answer with.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!("{message}"))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "Request failed: {:#}", self.error);
        } else {
            tracing::warn!(status = %self.status, "Request rejected: {:#}", self.error);
        }
        (self.status, Json(ApiResponse::failure(format!("{:#}", self.error)))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub analyzer: String,
    pub cache_entries: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status and active analyzer", body = HealthResponse)),
    tag = "Health"
)]
async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        analyzer: state.analyzer.name().to_string(),
        cache_entries: state.cache.as_ref().map(|c| c.len()),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .merge(property_routes::property_routes())
        .merge(ai_routes::ai_routes())
        .merge(openapi::openapi_routes())
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(cors)
        .with_state(state)
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

fn build_analyzer(mode: AnalyzerMode) -> anyhow::Result<(Arc<dyn PropertyAnalyzer>, Option<CallLog>)> {
    match mode {
        AnalyzerMode::Rules => {
            let analyzer: Arc<dyn PropertyAnalyzer> = Arc::new(RuleBasedAnalyzer::new());
            Ok((analyzer, None))
        }
        AnalyzerMode::ScoutGpt => {
            let scout = ScoutConfig::default();
            tracing::info!(
                endpoint = %scout.endpoint,
                timeout_secs = scout.timeout.as_secs(),
                call_log_capacity = scout.call_log_capacity,
                "Using ScoutGPT analyzer with rule-based fallback"
            );
            let scout_analyzer = ScoutGptAnalyzer::from_config(&scout)?;
            let call_log = scout_analyzer.call_log().clone();
            let analyzer: Arc<dyn PropertyAnalyzer> = Arc::new(scout_analyzer);
            Ok((analyzer, Some(call_log)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let (analyzer, call_log) = build_analyzer(config.analyzer_mode)?;
    let bind_addr = config.bind_addr.clone();
    let mut state = AppState::new(analyzer, config);
    if let Some(call_log) = call_log {
        state = state.with_call_log(call_log);
    }

    if let Some(cache) = state.cache.clone() {
        let ttl = state.config.cache_ttl;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ttl);
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired analyses");
                }
            }
        });
    }

    tracing::info!(
        analyzer = state.analyzer.name(),
        max_batch_size = state.config.max_batch_size,
        cache = state.cache.is_some(),
        "Starting ScoutIQ API server"
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!("Listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
