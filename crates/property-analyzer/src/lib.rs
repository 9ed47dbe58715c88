//! Rule-based property analysis.
//!
//! Maps a [`SignalSet`] to an investment score, a Buy/Hold/Watch label, a
//! confidence, a risk level and template text. Stateless: the same signals
//! always produce the same result.

pub mod market;
pub mod narrative;
pub mod pipeline;
pub mod scoring;

use async_trait::async_trait;
use property_core::{
    AnalysisContext, AnalysisError, AnalysisResult, Classification, DataStatus, MarketSummary,
    PropertyAnalyzer, RiskLevel, SignalSet,
};

pub use market::MarketAggregator;
pub use pipeline::{
    analyze_record, analyze_signals, insufficient_record, validate_record, RecordAnalysis,
};
pub use scoring::{confidence_for_score, score_breakdown};

#[derive(Debug, Clone, Default)]
pub struct RuleBasedAnalyzer {
    aggregator: MarketAggregator,
}

impl RuleBasedAnalyzer {
    pub const NAME: &'static str = "rules";

    pub fn new() -> Self {
        Self::default()
    }

    /// Score and describe one property.
    pub fn evaluate(&self, signals: &SignalSet) -> AnalysisResult {
        let breakdown = score_breakdown(signals);
        let score = breakdown.score();
        let classification = Classification::from_score(score);

        AnalysisResult {
            property_id: signals.property_id.clone(),
            classification,
            confidence: confidence_for_score(score),
            investment_score: score,
            risk_level: RiskLevel::from_score(score),
            summary: narrative::summary(signals, classification, score),
            insights: narrative::insights(signals, classification),
            score_breakdown: Some(breakdown),
            data_status: if signals.issues.is_empty() {
                DataStatus::Complete
            } else {
                DataStatus::Partial
            },
            analyzer: Self::NAME.to_string(),
        }
    }

    /// Evaluate every signal set, keeping each next to its result.
    pub fn evaluate_all(&self, batch: &[SignalSet]) -> Vec<(SignalSet, AnalysisResult)> {
        batch
            .iter()
            .map(|s| (s.clone(), self.evaluate(s)))
            .collect()
    }

    /// Evaluate a batch and aggregate it into a market summary.
    pub fn analyze_batch(&self, batch: &[SignalSet]) -> MarketSummary {
        self.aggregator.summarize(&self.evaluate_all(batch), Self::NAME)
    }
}

#[async_trait]
impl PropertyAnalyzer for RuleBasedAnalyzer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn analyze(
        &self,
        _context: &AnalysisContext,
        signals: &SignalSet,
    ) -> Result<AnalysisResult, AnalysisError> {
        Ok(self.evaluate(signals))
    }

    async fn summarize(
        &self,
        context: &AnalysisContext,
        batch: &[SignalSet],
    ) -> Result<MarketSummary, AnalysisError> {
        tracing::debug!(
            county = context.county.as_deref().unwrap_or("-"),
            properties = batch.len(),
            "Rule-based market summary"
        );
        Ok(self.analyze_batch(batch))
    }
}
