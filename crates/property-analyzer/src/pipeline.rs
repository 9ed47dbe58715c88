//! Record-to-result pipeline shared by every caller: validate the record,
//! derive signals, run the configured analyzer, and absorb failures into
//! an explicit result instead of propagating them.

use property_core::{
    AnalysisContext, AnalysisError, AnalysisResult, PropertyAnalyzer, PropertyRecord, SignalSet,
};
use serde::Serialize;
use signal_computer::SignalComputer;

use crate::RuleBasedAnalyzer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordAnalysis {
    /// `None` when the record was absent or unusable
    pub signals: Option<SignalSet>,
    pub analysis: AnalysisResult,
}

/// Reject records that are absent or carry no scoring input at all.
pub fn validate_record(record: Option<&PropertyRecord>) -> Result<&PropertyRecord, AnalysisError> {
    let record = record
        .ok_or_else(|| AnalysisError::InvalidRecord("no property record supplied".to_string()))?;
    if !record.has_scoring_inputs() {
        return Err(AnalysisError::InvalidRecord(
            "record has no valuation, construction year, ownership or flood attributes".to_string(),
        ));
    }
    Ok(record)
}

/// The explicit result for a record that was absent, empty or unreadable.
pub fn insufficient_record(property_id: &str, error: &AnalysisError, analyzer: &str) -> RecordAnalysis {
    tracing::info!(property_id, "Insufficient data: {error}");
    let reason = match error {
        AnalysisError::InvalidRecord(reason) => reason.as_str(),
        _ => "record could not be read",
    };
    RecordAnalysis {
        signals: None,
        analysis: AnalysisResult::insufficient_data(property_id, reason, analyzer),
    }
}

/// Analyze one (possibly absent) record. Never fails: invalid records get
/// the insufficient-data result, analyzer errors fall back to the rules.
pub async fn analyze_record(
    analyzer: &dyn PropertyAnalyzer,
    computer: &SignalComputer,
    context: &AnalysisContext,
    record: Option<&PropertyRecord>,
) -> RecordAnalysis {
    let record = match validate_record(record) {
        Ok(r) => r,
        Err(e) => {
            let property_id = record.map(|r| r.property_id.as_str()).unwrap_or_default();
            return insufficient_record(property_id, &e, analyzer.name());
        }
    };

    let signals = computer.compute(record);
    let analysis = analyze_signals(analyzer, context, &signals).await;

    RecordAnalysis {
        signals: Some(signals),
        analysis,
    }
}

/// Run the analyzer on already-derived signals, falling back to the rules.
pub async fn analyze_signals(
    analyzer: &dyn PropertyAnalyzer,
    context: &AnalysisContext,
    signals: &SignalSet,
) -> AnalysisResult {
    match analyzer.analyze(context, signals).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                property_id = %signals.property_id,
                request_id = context.request_id().unwrap_or("-"),
                analyzer = analyzer.name(),
                "Analyzer failed, using rule-based result: {e}"
            );
            RuleBasedAnalyzer::new().evaluate(signals)
        }
    }
}
