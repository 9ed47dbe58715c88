//! Market-level aggregation over a batch of analyzed properties.

use property_core::stats::{format_usd, mean, median, min_max, round_to};
use property_core::{
    AnalysisResult, ClassificationBreakdown, MarketSentiment, MarketSummary, RiskLevel, SignalSet,
    ValuationRange,
};

#[derive(Debug, Clone, Default)]
pub struct MarketAggregator;

impl MarketAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate (signals, result) pairs. Unknown valuations and ages are
    /// left out of the averages rather than counted as zero.
    pub fn summarize(&self, batch: &[(SignalSet, AnalysisResult)], analyzer: &str) -> MarketSummary {
        let total = batch.len();
        if total == 0 {
            return Self::empty(analyzer);
        }

        let mut breakdown = ClassificationBreakdown::default();
        for (_, result) in batch {
            breakdown.record(result.classification);
        }
        let buy_ratio = breakdown.buy as f64 / total as f64;
        let sentiment = MarketSentiment::from_buy_ratio(buy_ratio);

        let valuations: Vec<f64> = batch.iter().filter_map(|(s, _)| s.primary_valuation).collect();
        let ages: Vec<f64> = batch
            .iter()
            .filter_map(|(s, _)| s.property_age.map(f64::from))
            .collect();
        let scores: Vec<f64> = batch
            .iter()
            .map(|(_, r)| f64::from(r.investment_score))
            .collect();
        let confidences: Vec<f64> = batch.iter().map(|(_, r)| r.confidence).collect();

        let average_valuation = mean(&valuations).map(|v| round_to(v, 2));
        let valuation_range = min_max(&valuations).map(|(min, max)| ValuationRange { min, max });
        let average_age = mean(&ages).map(|a| round_to(a, 1));
        let average_score = mean(&scores).map(|s| round_to(s, 1));

        let summary = Self::narrative(total, &breakdown, buy_ratio, sentiment, average_valuation);

        let mut insights = Vec::new();
        if let (Some(range), Some(avg)) = (valuation_range, average_valuation) {
            insights.push(format!(
                "Valuation range: {} - {} (avg: {})",
                format_usd(range.min),
                format_usd(range.max),
                format_usd(avg)
            ));
        }
        if let Some(age) = average_age {
            insights.push(format!("Average property age: {age:.0} years"));
        }
        let entity_owned = batch
            .iter()
            .filter(|(s, _)| s.ownership_type.is_entity())
            .count();
        if entity_owned * 2 > total {
            insights.push(
                "Majority LLC or corporate ownership indicates institutional investor presence"
                    .to_string(),
            );
        }
        let high_risk = batch
            .iter()
            .filter(|(_, r)| r.risk_level == RiskLevel::High)
            .count();
        if high_risk * 3 > total {
            insights.push(
                "Elevated risk profile across portfolio requires careful evaluation".to_string(),
            );
        }
        if let Some(score) = average_score {
            insights.push(format!("Average investment score: {score:.0}/100"));
        }

        MarketSummary {
            properties_analyzed: total,
            breakdown,
            buy_ratio: round_to(buy_ratio, 4),
            sentiment,
            average_valuation,
            median_valuation: median(&valuations).map(|v| round_to(v, 2)),
            valuation_range,
            average_age,
            average_score,
            average_confidence: mean(&confidences).map(|c| round_to(c, 2)),
            summary,
            insights,
            analyzer: analyzer.to_string(),
        }
    }

    fn empty(analyzer: &str) -> MarketSummary {
        MarketSummary {
            properties_analyzed: 0,
            breakdown: ClassificationBreakdown::default(),
            buy_ratio: 0.0,
            sentiment: MarketSentiment::Cautious,
            average_valuation: None,
            median_valuation: None,
            valuation_range: None,
            average_age: None,
            average_score: None,
            average_confidence: None,
            summary: "No properties provided for analysis.".to_string(),
            insights: Vec::new(),
            analyzer: analyzer.to_string(),
        }
    }

    fn narrative(
        total: usize,
        breakdown: &ClassificationBreakdown,
        buy_ratio: f64,
        sentiment: MarketSentiment,
        average_valuation: Option<f64>,
    ) -> String {
        let noun = if total == 1 { "property" } else { "properties" };
        let valuation = match average_valuation {
            Some(v) => format!("with average valuation of {}", format_usd(v)),
            None => "with undisclosed valuations".to_string(),
        };
        format!(
            "Analyzed {total} {noun} {valuation}. Market assessment: {} with {} buy opportunities ({:.0}%), \
             {} hold candidates, and {} properties requiring further evaluation.",
            sentiment.describe(),
            breakdown.buy,
            buy_ratio * 100.0,
            breakdown.hold,
            breakdown.watch,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use property_core::{Classification, DataStatus, OwnershipType};

    fn pair(score: u8, valuation: Option<f64>, age: Option<u32>) -> (SignalSet, AnalysisResult) {
        let mut s = SignalSet::neutral("P", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        s.primary_valuation = valuation;
        s.property_age = age;
        let r = AnalysisResult {
            property_id: "P".to_string(),
            classification: Classification::from_score(score),
            confidence: crate::scoring::confidence_for_score(score),
            investment_score: score,
            risk_level: RiskLevel::from_score(score),
            summary: String::new(),
            insights: Vec::new(),
            score_breakdown: None,
            data_status: DataStatus::Complete,
            analyzer: "rules".to_string(),
        };
        (s, r)
    }

    #[test]
    fn test_seven_buys_of_ten_is_strong() {
        let mut batch = Vec::new();
        for _ in 0..7 {
            batch.push(pair(80, Some(300_000.0), Some(10)));
        }
        for _ in 0..2 {
            batch.push(pair(60, Some(500_000.0), Some(30)));
        }
        batch.push(pair(20, None, None));

        let summary = MarketAggregator::new().summarize(&batch, "rules");
        assert_eq!(summary.properties_analyzed, 10);
        assert_eq!(summary.breakdown.buy, 7);
        assert_eq!(summary.breakdown.hold, 2);
        assert_eq!(summary.breakdown.watch, 1);
        assert_eq!(summary.sentiment, MarketSentiment::Strong);
        assert!((summary.buy_ratio - 0.7).abs() < 1e-9);
        // The unknown valuation is excluded, not averaged in as zero
        let expected_avg = (7.0 * 300_000.0 + 2.0 * 500_000.0) / 9.0;
        assert!((summary.average_valuation.unwrap() - expected_avg).abs() < 0.01);
        assert_eq!(summary.median_valuation, Some(300_000.0));
        let expected_age = (7.0 * 10.0 + 2.0 * 30.0) / 9.0;
        assert!((summary.average_age.unwrap() - round_to(expected_age, 1)).abs() < 1e-9);
        assert!(summary.summary.contains("strong investment market"));
        assert!(summary.summary.contains("7 buy opportunities (70%)"));
    }

    #[test]
    fn test_moderate_and_cautious() {
        let moderate: Vec<_> = [80, 80, 80, 60, 60, 60, 60, 20, 20, 20]
            .into_iter()
            .map(|s| pair(s, Some(200_000.0), Some(8)))
            .collect();
        let summary = MarketAggregator::new().summarize(&moderate, "rules");
        assert_eq!(summary.sentiment, MarketSentiment::Moderate);

        let cautious: Vec<_> = [80, 60, 60, 20]
            .into_iter()
            .map(|s| pair(s, Some(200_000.0), Some(8)))
            .collect();
        let summary = MarketAggregator::new().summarize(&cautious, "rules");
        assert_eq!(summary.sentiment, MarketSentiment::Cautious);
    }

    #[test]
    fn test_empty_batch() {
        let summary = MarketAggregator::new().summarize(&[], "rules");
        assert_eq!(summary.properties_analyzed, 0);
        assert_eq!(summary.sentiment, MarketSentiment::Cautious);
        assert_eq!(summary.summary, "No properties provided for analysis.");
        assert_eq!(summary.average_valuation, None);
    }

    #[test]
    fn test_market_insights() {
        let mut batch: Vec<_> = (0..3).map(|_| pair(30, Some(100_000.0), Some(50))).collect();
        batch.push(pair(90, Some(900_000.0), Some(5)));
        for (s, _) in batch.iter_mut().take(3) {
            s.ownership_type = OwnershipType::Llc;
        }

        let summary = MarketAggregator::new().summarize(&batch, "rules");
        assert_eq!(summary.insights[0], "Valuation range: $100,000 - $900,000 (avg: $300,000)");
        assert!(summary.insights.iter().any(|i| i.starts_with("Majority LLC")));
        assert!(summary.insights.iter().any(|i| i.starts_with("Elevated risk")));
        assert_eq!(
            summary.insights.last().map(String::as_str),
            Some("Average investment score: 45/100")
        );
    }

    #[test]
    fn test_single_property_wording() {
        let summary = MarketAggregator::new().summarize(&[pair(75, None, None)], "rules");
        assert!(summary.summary.starts_with("Analyzed 1 property with undisclosed valuations."));
    }
}
