use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Investment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Classification {
    Buy,
    Hold,
    Watch,
}

impl Classification {
    pub const BUY_THRESHOLD: u8 = 70;
    pub const HOLD_THRESHOLD: u8 = 50;

    /// Step function over the investment score: 70+ Buy, 50-69 Hold, below 50 Watch.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= Self::BUY_THRESHOLD => Classification::Buy,
            s if s >= Self::HOLD_THRESHOLD => Classification::Hold,
            _ => Classification::Watch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Buy => "Buy",
            Classification::Hold => "Hold",
            Classification::Watch => "Watch",
        }
    }

    /// Lenient parse of labels returned by external services.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "buy" | "strong buy" => Some(Classification::Buy),
            "hold" => Some(Classification::Hold),
            "watch" => Some(Classification::Watch),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level mirrors the classification bands, not the raw flood signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match Classification::from_score(score) {
            Classification::Buy => RiskLevel::Low,
            Classification::Hold => RiskLevel::Medium,
            Classification::Watch => RiskLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// How much of the record the analysis could actually use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Complete,
    Partial,
    Insufficient,
}

/// Per-signal point adjustments applied on top of the base score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScoreBreakdown {
    pub base: i32,
    pub valuation: i32,
    pub age: i32,
    pub ownership: i32,
    pub flood: i32,
}

impl ScoreBreakdown {
    /// Unclamped sum of base and adjustments
    pub fn raw_total(&self) -> i32 {
        self.base + self.valuation + self.age + self.ownership + self.flood
    }

    /// Sum clamped to the 0-100 investment score range
    pub fn score(&self) -> u8 {
        self.raw_total().clamp(0, 100) as u8
    }
}

/// Output of any property analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisResult {
    pub property_id: String,
    pub classification: Classification,
    pub confidence: f64, // 0.0 to 1.0
    pub investment_score: u8,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub insights: Vec<String>,
    #[serde(default)]
    pub score_breakdown: Option<ScoreBreakdown>,
    pub data_status: DataStatus,
    /// Name of the analyzer implementation that produced this result
    pub analyzer: String,
}

impl AnalysisResult {
    /// Explicit result for an absent or unusable record.
    pub fn insufficient_data(
        property_id: impl Into<String>,
        reason: &str,
        analyzer: impl Into<String>,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            classification: Classification::Watch,
            confidence: 0.0,
            investment_score: 0,
            risk_level: RiskLevel::High,
            summary: format!("Insufficient data for analysis: {reason}."),
            insights: vec![
                "Property record is missing or unreadable; verify the source data before evaluating"
                    .to_string(),
            ],
            score_breakdown: None,
            data_status: DataStatus::Insufficient,
            analyzer: analyzer.into(),
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.data_status == DataStatus::Insufficient
    }
}

/// Aggregate market label derived from the Buy ratio of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MarketSentiment {
    Strong,
    Moderate,
    Cautious,
}

impl MarketSentiment {
    /// 60%+ Buy is strong, 30-59% moderate, anything lower cautious.
    pub fn from_buy_ratio(ratio: f64) -> Self {
        if ratio >= 0.60 {
            MarketSentiment::Strong
        } else if ratio >= 0.30 {
            MarketSentiment::Moderate
        } else {
            MarketSentiment::Cautious
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSentiment::Strong => "strong",
            MarketSentiment::Moderate => "moderate",
            MarketSentiment::Cautious => "cautious",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            MarketSentiment::Strong => "strong investment market",
            MarketSentiment::Moderate => "moderately favorable market",
            MarketSentiment::Cautious => "cautious market environment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClassificationBreakdown {
    pub buy: usize,
    pub hold: usize,
    pub watch: usize,
}

impl ClassificationBreakdown {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Buy => self.buy += 1,
            Classification::Hold => self.hold += 1,
            Classification::Watch => self.watch += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.buy + self.hold + self.watch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValuationRange {
    pub min: f64,
    pub max: f64,
}

/// Market-level view of a batch of analyzed properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarketSummary {
    pub properties_analyzed: usize,
    pub breakdown: ClassificationBreakdown,
    pub buy_ratio: f64,
    pub sentiment: MarketSentiment,
    pub average_valuation: Option<f64>,
    pub median_valuation: Option<f64>,
    pub valuation_range: Option<ValuationRange>,
    pub average_age: Option<f64>,
    pub average_score: Option<f64>,
    pub average_confidence: Option<f64>,
    pub summary: String,
    pub insights: Vec<String>,
    /// Name of the analyzer implementation that produced the narrative
    pub analyzer: String,
}

/// Request-scoped context forwarded to analyzers (county, campaign, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl AnalysisContext {
    pub const REQUEST_ID_KEY: &'static str = "request_id";

    pub fn for_county(county: impl Into<String>) -> Self {
        Self {
            county: Some(county.into()),
            ..Default::default()
        }
    }

    /// Tag the context with the HTTP request id so downstream calls can be
    /// correlated with the request that caused them.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.extra.insert(
            Self::REQUEST_ID_KEY.to_string(),
            serde_json::Value::String(request_id.into()),
        );
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.extra.get(Self::REQUEST_ID_KEY).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(Classification::from_score(100), Classification::Buy);
        assert_eq!(Classification::from_score(70), Classification::Buy);
        assert_eq!(Classification::from_score(69), Classification::Hold);
        assert_eq!(Classification::from_score(50), Classification::Hold);
        assert_eq!(Classification::from_score(49), Classification::Watch);
        assert_eq!(Classification::from_score(0), Classification::Watch);
    }

    #[test]
    fn test_risk_level_mirrors_classification() {
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::High);
    }

    #[test]
    fn test_score_breakdown_clamps() {
        let high = ScoreBreakdown { base: 50, valuation: 15, age: 20, ownership: 10, flood: 10 };
        assert_eq!(high.raw_total(), 105);
        assert_eq!(high.score(), 100);

        let low = ScoreBreakdown { base: 50, valuation: -60, ..Default::default() };
        assert_eq!(low.score(), 0);
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(MarketSentiment::from_buy_ratio(0.7), MarketSentiment::Strong);
        assert_eq!(MarketSentiment::from_buy_ratio(0.6), MarketSentiment::Strong);
        assert_eq!(MarketSentiment::from_buy_ratio(0.59), MarketSentiment::Moderate);
        assert_eq!(MarketSentiment::from_buy_ratio(0.3), MarketSentiment::Moderate);
        assert_eq!(MarketSentiment::from_buy_ratio(0.29), MarketSentiment::Cautious);
    }

    #[test]
    fn test_parse_external_labels() {
        assert_eq!(Classification::parse(" BUY "), Some(Classification::Buy));
        assert_eq!(Classification::parse("watch"), Some(Classification::Watch));
        assert_eq!(Classification::parse("Error"), None);
    }

    #[test]
    fn test_insufficient_data_result() {
        let result = AnalysisResult::insufficient_data("", "no property record supplied", "rules");
        assert!(result.is_insufficient());
        assert_eq!(result.classification, Classification::Watch);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.insights.len(), 1);
    }

    #[test]
    fn test_context_request_id() {
        let ctx = AnalysisContext::for_county("Travis").with_request_id("req-7");
        assert_eq!(ctx.request_id(), Some("req-7"));
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["request_id"], "req-7");
        assert_eq!(json["county"], "Travis");
        assert_eq!(AnalysisContext::default().request_id(), None);
    }

    #[test]
    fn test_context_keeps_extra_keys() {
        let ctx: AnalysisContext =
            serde_json::from_value(serde_json::json!({"county": "Travis", "campaign": "q3"})).unwrap();
        assert_eq!(ctx.county.as_deref(), Some("Travis"));
        assert_eq!(ctx.extra.get("campaign"), Some(&serde_json::json!("q3")));
    }
}
