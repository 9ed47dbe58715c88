//! Fixed-weight additive scoring.
//!
//! | signal     | adjustment                                                  |
//! |------------|-------------------------------------------------------------|
//! | valuation  | Low +15, Mid +5, High -10, unknown 0                        |
//! | age        | 0-4 +10, 5-20 +20, 21-40 0, over 40 -15, unknown 0          |
//! | ownership  | Individual +5, LLC/Corporation +10                          |
//! | flood      | Low +10, Medium -10, High -20, Unknown 0                    |
//!
//! Base 50, clamped to 0-100 after summation.

use property_core::stats::round_to;
use property_core::{
    Classification, FloodRisk, OwnershipType, ScoreBreakdown, SignalSet, ValuationBand,
};

pub const BASE_SCORE: i32 = 50;

pub fn valuation_adjustment(band: Option<ValuationBand>) -> i32 {
    match band {
        Some(ValuationBand::Low) => 15,  // entry-level opportunity
        Some(ValuationBand::Mid) => 5,   // mid-range sweet spot
        Some(ValuationBand::High) => -10, // higher capital at risk
        None => 0,
    }
}

pub fn age_adjustment(age: Option<u32>) -> i32 {
    match age {
        Some(0..=4) => 10,
        Some(5..=20) => 20,
        Some(21..=40) => 0,
        Some(_) => -15,
        None => 0,
    }
}

pub fn ownership_adjustment(ownership: OwnershipType) -> i32 {
    match ownership {
        OwnershipType::Individual => 5,
        OwnershipType::Llc | OwnershipType::Corporation => 10,
    }
}

pub fn flood_adjustment(flood: FloodRisk) -> i32 {
    match flood {
        FloodRisk::Low => 10,
        FloodRisk::Medium => -10,
        FloodRisk::High => -20,
        FloodRisk::Unknown => 0,
    }
}

/// Per-signal adjustments for a signal set. The band is re-derived from the
/// valuation when a caller supplied one without the other.
pub fn score_breakdown(signals: &SignalSet) -> ScoreBreakdown {
    let band = signals
        .valuation_band
        .or_else(|| signals.primary_valuation.filter(|v| *v > 0.0).map(ValuationBand::from_valuation));

    ScoreBreakdown {
        base: BASE_SCORE,
        valuation: valuation_adjustment(band),
        age: age_adjustment(signals.property_age),
        ownership: ownership_adjustment(signals.ownership_type),
        flood: flood_adjustment(signals.flood_risk),
    }
}

/// Confidence for a score, linear within each classification band and
/// rounded to two decimals:
///
/// - Buy (70-100): 0.75 to 0.95
/// - Hold (50-69): 0.60 to 0.74
/// - Watch (0-49): 0.50 to 0.59
pub fn confidence_for_score(score: u8) -> f64 {
    let s = score.min(100) as f64;
    let raw = match Classification::from_score(score) {
        Classification::Buy => 0.75 + (s - 70.0) * 0.20 / 30.0,
        Classification::Hold => 0.60 + (s - 50.0) * 0.14 / 19.0,
        Classification::Watch => 0.50 + s * 0.09 / 49.0,
    };
    round_to(raw, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn signals(
        valuation: Option<f64>,
        age: Option<u32>,
        ownership: OwnershipType,
        flood: FloodRisk,
    ) -> SignalSet {
        let mut s = SignalSet::neutral("T", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        s.primary_valuation = valuation;
        s.valuation_band = valuation.map(ValuationBand::from_valuation);
        s.property_age = age;
        s.ownership_type = ownership;
        s.flood_risk = flood;
        s
    }

    #[test]
    fn test_valuation_adjustments() {
        assert_eq!(valuation_adjustment(Some(ValuationBand::from_valuation(249_999.0))), 15);
        assert_eq!(valuation_adjustment(Some(ValuationBand::from_valuation(250_000.0))), 5);
        assert_eq!(valuation_adjustment(Some(ValuationBand::from_valuation(750_000.0))), 5);
        assert_eq!(valuation_adjustment(Some(ValuationBand::from_valuation(750_001.0))), -10);
        assert_eq!(valuation_adjustment(None), 0);
    }

    #[test]
    fn test_age_adjustments() {
        assert_eq!(age_adjustment(Some(0)), 10);
        assert_eq!(age_adjustment(Some(4)), 10);
        assert_eq!(age_adjustment(Some(5)), 20);
        assert_eq!(age_adjustment(Some(20)), 20);
        assert_eq!(age_adjustment(Some(21)), 0);
        assert_eq!(age_adjustment(Some(40)), 0);
        assert_eq!(age_adjustment(Some(41)), -15);
        assert_eq!(age_adjustment(None), 0);
    }

    #[test]
    fn test_flood_and_ownership_adjustments() {
        assert_eq!(flood_adjustment(FloodRisk::Low), 10);
        assert_eq!(flood_adjustment(FloodRisk::Medium), -10);
        assert_eq!(flood_adjustment(FloodRisk::High), -20);
        assert_eq!(flood_adjustment(FloodRisk::Unknown), 0);
        assert_eq!(ownership_adjustment(OwnershipType::Individual), 5);
        assert_eq!(ownership_adjustment(OwnershipType::Llc), 10);
        assert_eq!(ownership_adjustment(OwnershipType::Corporation), 10);
    }

    #[test]
    fn test_score_is_clamped_sum() {
        let ownerships = [OwnershipType::Individual, OwnershipType::Llc, OwnershipType::Corporation];
        let floods = [FloodRisk::Low, FloodRisk::Medium, FloodRisk::High, FloodRisk::Unknown];
        let valuations = [None, Some(100_000.0), Some(500_000.0), Some(2_000_000.0)];
        let ages = [None, Some(2), Some(12), Some(30), Some(80)];

        for v in valuations {
            for a in ages {
                for o in ownerships {
                    for f in floods {
                        let s = signals(v, a, o, f);
                        let b = score_breakdown(&s);
                        let expected = (50
                            + valuation_adjustment(s.valuation_band)
                            + age_adjustment(a)
                            + ownership_adjustment(o)
                            + flood_adjustment(f))
                        .clamp(0, 100);
                        assert_eq!(b.score() as i32, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_maximum_score_clamps_to_100() {
        let s = signals(Some(100_000.0), Some(10), OwnershipType::Llc, FloodRisk::Low);
        let b = score_breakdown(&s);
        assert_eq!(b.raw_total(), 105);
        assert_eq!(b.score(), 100);
    }

    #[test]
    fn test_band_derived_from_valuation_when_missing() {
        let mut s = signals(Some(100_000.0), None, OwnershipType::Individual, FloodRisk::Unknown);
        s.valuation_band = None;
        assert_eq!(score_breakdown(&s).valuation, 15);
    }

    #[test]
    fn test_confidence_band_ranges() {
        assert_eq!(confidence_for_score(70), 0.75);
        assert_eq!(confidence_for_score(100), 0.95);
        assert_eq!(confidence_for_score(50), 0.60);
        assert_eq!(confidence_for_score(69), 0.74);
        assert_eq!(confidence_for_score(0), 0.50);
        assert_eq!(confidence_for_score(49), 0.59);
    }

    #[test]
    fn test_confidence_monotonic_within_bands() {
        for band in [0u8..=49, 50..=69, 70..=100] {
            let values: Vec<f64> = band.map(confidence_for_score).collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
        }
        for score in 0..=100u8 {
            let c = confidence_for_score(score);
            assert!((0.0..=1.0).contains(&c));
        }
    }
}
