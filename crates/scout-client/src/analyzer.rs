use async_trait::async_trait;
use property_analyzer::{confidence_for_score, RuleBasedAnalyzer};
use property_core::{
    AnalysisContext, AnalysisError, AnalysisResult, Classification, MarketSummary,
    PropertyAnalyzer, RiskLevel, SignalSet,
};

use crate::call_log::CallLog;
use crate::client::ScoutGptClient;
use crate::error::ScoutResult;
use crate::models::ScoutResponse;
use crate::ScoutConfig;

/// Marker put in front of summaries produced after ScoutGPT failed.
pub const FALLBACK_PREFIX: &str = "[Rule-based fallback]";

/// Narrative cap for AI-provided insights, matching the rule engine's
/// five signal insights plus one classification insight.
const MAX_AI_INSIGHTS: usize = 6;

/// Analyzer backed by ScoutGPT.
///
/// The score always drives classification, confidence and risk so results
/// stay consistent with the rule engine's bands. ScoutGPT may move the score
/// and replace the narrative. Any failure degrades to the rule-based result
/// with a prefixed summary.
pub struct ScoutGptAnalyzer {
    client: ScoutGptClient,
    rules: RuleBasedAnalyzer,
}

impl ScoutGptAnalyzer {
    pub const NAME: &'static str = "scoutgpt";

    pub fn new(client: ScoutGptClient) -> Self {
        Self {
            client,
            rules: RuleBasedAnalyzer::new(),
        }
    }

    pub fn from_config(config: &ScoutConfig) -> ScoutResult<Self> {
        Ok(Self::new(ScoutGptClient::from_config(config)?))
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn call_log(&self) -> &CallLog {
        self.client.call_log()
    }

    async fn try_analyze(
        &self,
        context: &AnalysisContext,
        signals: &SignalSet,
        base: &AnalysisResult,
    ) -> Result<AnalysisResult, AnalysisError> {
        let response = self
            .client
            .analyze(context, std::slice::from_ref(signals))
            .await?;
        Ok(merge_property(base.clone(), response))
    }

    async fn try_summarize(
        &self,
        context: &AnalysisContext,
        batch: &[SignalSet],
        base: &MarketSummary,
    ) -> Result<MarketSummary, AnalysisError> {
        let response = self.client.analyze(context, batch).await?;
        Ok(merge_market(base.clone(), response))
    }
}

#[async_trait]
impl PropertyAnalyzer for ScoutGptAnalyzer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn analyze(
        &self,
        context: &AnalysisContext,
        signals: &SignalSet,
    ) -> Result<AnalysisResult, AnalysisError> {
        let base = self.rules.evaluate(signals);
        match self.try_analyze(context, signals, &base).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(
                    property_id = %signals.property_id,
                    request_id = context.request_id().unwrap_or("-"),
                    error = %e,
                    "ScoutGPT unavailable, using rule-based analysis"
                );
                Ok(with_fallback_summary(base))
            }
        }
    }

    async fn summarize(
        &self,
        context: &AnalysisContext,
        batch: &[SignalSet],
    ) -> Result<MarketSummary, AnalysisError> {
        let base = self.rules.analyze_batch(batch);
        if batch.is_empty() {
            return Ok(base);
        }

        match self.try_summarize(context, batch, &base).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!(
                    properties = batch.len(),
                    error = %e,
                    "ScoutGPT unavailable, using rule-based market summary"
                );
                let mut summary = base;
                summary.summary = format!("{FALLBACK_PREFIX} {}", summary.summary);
                Ok(summary)
            }
        }
    }
}

fn with_fallback_summary(mut result: AnalysisResult) -> AnalysisResult {
    result.summary = format!("{FALLBACK_PREFIX} {}", result.summary);
    result
}

/// Combine a rule-based result with the ScoutGPT answer for the same property.
fn merge_property(base: AnalysisResult, response: ScoutResponse) -> AnalysisResult {
    let score = response.investment_score.unwrap_or(base.investment_score);
    let classification = Classification::from_score(score);

    if let Some(label) = response.classification {
        if label != classification {
            tracing::debug!(
                property_id = %base.property_id,
                returned = %label,
                derived = %classification,
                "Ignoring ScoutGPT label that disagrees with its score"
            );
        }
    }

    let score_breakdown = if score == base.investment_score {
        base.score_breakdown
    } else {
        None
    };

    AnalysisResult {
        property_id: base.property_id,
        classification,
        confidence: confidence_for_score(score),
        investment_score: score,
        risk_level: RiskLevel::from_score(score),
        summary: if response.summary.is_empty() {
            base.summary
        } else {
            response.summary
        },
        insights: if response.insights.is_empty() {
            base.insights
        } else {
            response.insights.into_iter().take(MAX_AI_INSIGHTS).collect()
        },
        score_breakdown,
        data_status: base.data_status,
        analyzer: ScoutGptAnalyzer::NAME.to_string(),
    }
}

/// Aggregates stay rule-computed; only the narrative comes from ScoutGPT.
fn merge_market(mut base: MarketSummary, response: ScoutResponse) -> MarketSummary {
    if !response.summary.is_empty() {
        base.summary = response.summary;
    }
    if !response.insights.is_empty() {
        base.insights = response.insights;
    }
    base.analyzer = ScoutGptAnalyzer::NAME.to_string();
    base
}
