use async_trait::async_trait;

use crate::{AnalysisContext, AnalysisError, AnalysisResult, MarketSummary, SignalSet};

/// Trait for property analyzers. The rule-based scorer and the external AI
/// service both sit behind it; which one serves a request is configuration.
#[async_trait]
pub trait PropertyAnalyzer: Send + Sync {
    /// Short identifier reported in results and health checks
    fn name(&self) -> &'static str;

    /// Analyze one property. `context` is request-scoped (county, request
    /// id, caller-supplied keys) and may be empty.
    async fn analyze(
        &self,
        context: &AnalysisContext,
        signals: &SignalSet,
    ) -> Result<AnalysisResult, AnalysisError>;

    /// Analyze a batch and aggregate it into a market summary.
    async fn summarize(
        &self,
        context: &AnalysisContext,
        batch: &[SignalSet],
    ) -> Result<MarketSummary, AnalysisError>;
}
