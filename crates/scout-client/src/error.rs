use property_core::AnalysisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ScoutResult<T> = Result<T, ScoutError>;

impl From<ScoutError> for AnalysisError {
    fn from(e: ScoutError) -> Self {
        AnalysisError::Service(e.to_string())
    }
}
