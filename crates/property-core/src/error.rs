use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Analysis service error: {0}")]
    Service(String),
}

/// Non-fatal problem found while deriving signals. The affected signal falls
/// back to its neutral value and the issue travels with the signal set.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    #[error("missing field: {field}")]
    MissingField { field: String },

    #[error("unparseable {field}: {value:?}")]
    UnparseableField { field: String, value: String },

    #[error("unsupported ownership text: {text:?}")]
    UnsupportedOwnershipText { text: String },
}

impl DataIssue {
    pub fn missing(field: &str) -> Self {
        DataIssue::MissingField {
            field: field.to_string(),
        }
    }

    pub fn unparseable(field: &str, value: impl Into<String>) -> Self {
        DataIssue::UnparseableField {
            field: field.to_string(),
            value: value.into(),
        }
    }
}
