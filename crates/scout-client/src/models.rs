use chrono::NaiveDate;
use property_core::{
    AnalysisContext, Classification, FloodRisk, OwnershipType, RawField, SignalSet, ValuationBand,
};
use serde::{Deserialize, Serialize};

use crate::error::{ScoutError, ScoutResult};

/// Per-property payload sent to ScoutGPT
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoutSignal {
    pub property_id: String,
    pub address: Option<String>,
    pub primary_valuation: Option<f64>,
    pub valuation_band: Option<ValuationBand>,
    pub ownership_type: OwnershipType,
    pub loan_maturity: Option<NaiveDate>,
    pub flood_risk: FloodRisk,
    pub property_age: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&SignalSet> for ScoutSignal {
    fn from(s: &SignalSet) -> Self {
        Self {
            property_id: s.property_id.clone(),
            address: s.address.clone(),
            primary_valuation: s.primary_valuation,
            valuation_band: s.valuation_band,
            ownership_type: s.ownership_type,
            loan_maturity: s.loan_maturity,
            flood_risk: s.flood_risk,
            property_age: s.property_age,
            latitude: s.latitude,
            longitude: s.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoutRequest<'a> {
    pub context: &'a AnalysisContext,
    pub signals: Vec<ScoutSignal>,
}

/// Response body as the service actually sends it. Every key is optional and
/// numbers may arrive as strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawScoutResponse {
    summary: Option<String>,
    classification: Option<String>,
    status: Option<String>,
    confidence: Option<RawField>,
    insights: Option<Vec<String>>,
    investment_score: Option<RawField>,
}

/// Normalized ScoutGPT answer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoutResponse {
    pub summary: String,
    /// Label exactly as returned, for logging
    pub raw_classification: String,
    pub classification: Option<Classification>,
    pub confidence: f64,
    pub insights: Vec<String>,
    pub investment_score: Option<u8>,
}

impl RawScoutResponse {
    pub(crate) fn normalize(self) -> ScoutResult<ScoutResponse> {
        let raw_classification = self
            .classification
            .or(self.status)
            .unwrap_or_else(|| "Unknown".to_string());
        let summary = self.summary.unwrap_or_default().trim().to_string();

        if raw_classification.trim().eq_ignore_ascii_case("error") {
            return Err(ScoutError::InvalidResponse(if summary.is_empty() {
                "service reported an error".to_string()
            } else {
                summary
            }));
        }

        let confidence = self
            .confidence
            .and_then(|c| c.as_f64())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        let investment_score = self
            .investment_score
            .and_then(|s| s.as_f64())
            .map(|s| s.round().clamp(0.0, 100.0) as u8);

        let insights = self
            .insights
            .unwrap_or_default()
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        Ok(ScoutResponse {
            summary,
            classification: Classification::parse(&raw_classification),
            raw_classification,
            confidence,
            insights,
            investment_score,
        })
    }
}
