use std::time::{Duration, Instant};

use property_core::{AnalysisContext, SignalSet};

use crate::call_log::{CallLog, CallOutcome};
use crate::error::{ScoutError, ScoutResult};
use crate::models::{RawScoutResponse, ScoutRequest, ScoutResponse, ScoutSignal};
use crate::ScoutConfig;

#[derive(Clone)]
pub struct ScoutGptClient {
    client: reqwest::Client,
    endpoint: String,
    call_log: CallLog,
}

impl ScoutGptClient {
    pub fn new(endpoint: String, timeout: Duration) -> ScoutResult<Self> {
        Self::with_call_log(endpoint, timeout, CallLog::default())
    }

    pub fn with_call_log(endpoint: String, timeout: Duration, call_log: CallLog) -> ScoutResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            call_log,
        })
    }

    pub fn from_config(config: &ScoutConfig) -> ScoutResult<Self> {
        Self::with_call_log(
            config.endpoint.clone(),
            config.timeout,
            CallLog::new(config.call_log_capacity),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// History of every call made through this client.
    pub fn call_log(&self) -> &CallLog {
        &self.call_log
    }

    /// Send a batch of signals with request context and return the
    /// normalized answer. Every call is traced and kept in the call log with
    /// its duration and outcome.
    pub async fn analyze(
        &self,
        context: &AnalysisContext,
        signals: &[SignalSet],
    ) -> ScoutResult<ScoutResponse> {
        let request = ScoutRequest {
            context,
            signals: signals.iter().map(ScoutSignal::from).collect(),
        };

        let started = Instant::now();
        let outcome = self.send(&request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(resp) => tracing::info!(
                endpoint = %self.endpoint,
                request_id = context.request_id().unwrap_or("-"),
                duration_ms,
                properties = request.signals.len(),
                classification = %resp.raw_classification,
                confidence = resp.confidence,
                "ScoutGPT request succeeded"
            ),
            Err(e) => tracing::warn!(
                endpoint = %self.endpoint,
                request_id = context.request_id().unwrap_or("-"),
                duration_ms,
                properties = request.signals.len(),
                error = %e,
                "ScoutGPT request failed"
            ),
        }

        self.call_log
            .record(CallOutcome {
                endpoint: self.endpoint.clone(),
                request_id: context.request_id().map(str::to_string),
                county: context.county.clone(),
                property_ids: signals.iter().map(|s| s.property_id.clone()).collect(),
                classification: outcome.as_ref().ok().map(|r| r.raw_classification.clone()),
                confidence: outcome.as_ref().map(|r| r.confidence).unwrap_or(0.0),
                processing_time_ms: duration_ms,
                error: outcome.as_ref().err().map(|e| e.to_string()),
            })
            .await;

        outcome
    }

    async fn send(&self, request: &ScoutRequest<'_>) -> ScoutResult<ScoutResponse> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::ServiceUnavailable(format!(
                "Status: {}{}",
                status,
                if body.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", body.chars().take(200).collect::<String>())
                }
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ScoutError::InvalidResponse("empty response body".to_string()));
        }

        let raw: RawScoutResponse = serde_json::from_slice(&bytes)?;
        raw.normalize()
    }
}
