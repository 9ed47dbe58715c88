//! Client for the external ScoutGPT analysis endpoint, plus the
//! [`PropertyAnalyzer`](property_core::PropertyAnalyzer) implementation that
//! uses it and falls back to the rule-based scorer when it is unavailable.

pub mod analyzer;
pub mod call_log;
pub mod client;
pub mod error;
pub mod models;

pub use analyzer::ScoutGptAnalyzer;
pub use call_log::{CallLog, CallRecord, CallStatistics, DEFAULT_CALL_LOG_CAPACITY};
pub use client::ScoutGptClient;
pub use error::{ScoutError, ScoutResult};
pub use models::{ScoutResponse, ScoutSignal};

use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8001/api/analyze";

/// Configuration for the ScoutGPT service
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Number of calls kept for `/api/ai-logs`
    pub call_log_capacity: usize,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("SCOUTGPT_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                std::env::var("SCOUTGPT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            call_log_capacity: std::env::var("SCOUTGPT_CALL_LOG_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CALL_LOG_CAPACITY),
        }
    }
}
