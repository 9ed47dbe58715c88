//! Template-based summary and insight text.

use property_core::stats::format_usd;
use property_core::{Classification, FloodRisk, OwnershipType, SignalSet, ValuationBand};

/// Signal-driven insights kept before the closing classification insight.
pub const MAX_SIGNAL_INSIGHTS: usize = 5;

const LOAN_MATURITY_HORIZON_MONTHS: i64 = 24;

pub fn summary(signals: &SignalSet, classification: Classification, score: u8) -> String {
    let valuation = signals
        .primary_valuation
        .map(format_usd)
        .unwrap_or_else(|| "undisclosed".to_string());
    let city = signals.city.as_deref().unwrap_or("an undisclosed location");

    let opening = match classification {
        Classification::Buy => {
            format!("This property presents attractive fundamentals with a valuation of {valuation} in {city}.")
        }
        Classification::Hold => format!("This property offers a valuation of {valuation} in {city}."),
        Classification::Watch => {
            format!("This property warrants caution at a valuation of {valuation} in {city}.")
        }
    };

    let built = match signals.property_age {
        Some(0) => "Newly built".to_string(),
        Some(1) => "Built 1 year ago".to_string(),
        Some(age) => format!("Built {age} years ago"),
        None => "With an unknown construction year".to_string(),
    };

    let verdict = match classification {
        Classification::Buy => "is a strong investment opportunity",
        Classification::Hold => "offers moderate investment potential",
        Classification::Watch => "requires careful evaluation",
    };

    let flood = match signals.flood_risk {
        FloodRisk::High => "Note: property has high flood risk exposure. ",
        FloodRisk::Medium => "Note: property has moderate flood risk exposure. ",
        FloodRisk::Low => "Low flood risk enhances investment appeal. ",
        FloodRisk::Unknown => "Flood exposure could not be assessed. ",
    };

    format!(
        "{opening} {built}, this {}-owned property {verdict}. {flood}Investment score: {score}/100.",
        signals.ownership_type.owned_label()
    )
}

/// Ordered insights: at most [`MAX_SIGNAL_INSIGHTS`] signal insights, then
/// one classification insight, so the list is never empty.
pub fn insights(signals: &SignalSet, classification: Classification) -> Vec<String> {
    let mut out: Vec<&'static str> = Vec::new();

    let band = signals
        .valuation_band
        .or_else(|| signals.primary_valuation.filter(|v| *v > 0.0).map(ValuationBand::from_valuation));
    match band {
        Some(ValuationBand::Low) => {
            out.push("Entry-level price point offers accessibility for first-time investors")
        }
        Some(ValuationBand::Mid) => {
            out.push("Mid-market valuation balances opportunity with manageable risk")
        }
        Some(ValuationBand::High) => {
            out.push("Premium valuation requires higher capital commitment and risk tolerance")
        }
        None => {}
    }

    match signals.property_age {
        Some(0..=4) => out.push("Recent construction reduces immediate maintenance concerns"),
        Some(5..=20) => {
            out.push("Prime property age combines modern amenities with established value")
        }
        Some(age) if age > 40 => {
            out.push("Older property may require capital improvements or renovation")
        }
        _ => {}
    }

    out.push(match signals.ownership_type {
        OwnershipType::Llc => "LLC ownership suggests professional investment approach",
        OwnershipType::Corporation => {
            "Corporate ownership may indicate institutional investment interest"
        }
        OwnershipType::Individual => {
            "Individual ownership typical for owner-occupied or personal investment"
        }
    });

    match signals.flood_risk {
        FloodRisk::High => {
            out.push("High flood risk requires comprehensive insurance and mitigation planning")
        }
        FloodRisk::Medium => out.push("Moderate flood exposure warrants insurance review"),
        FloodRisk::Low => out.push("Low flood risk enhances long-term value stability"),
        FloodRisk::Unknown => {}
    }

    if signals.absentee_owner {
        out.push("Absentee owner may be more receptive to acquisition offers");
    }

    if signals
        .months_to_loan_maturity()
        .is_some_and(|m| (0..=LOAN_MATURITY_HORIZON_MONTHS).contains(&m))
    {
        out.push("Loan matures within 24 months; refinancing pressure may motivate a sale");
    }

    if signals.recent_sale {
        out.push("Sold within the past year; pricing reflects current market conditions");
    }

    out.truncate(MAX_SIGNAL_INSIGHTS);
    out.push(match classification {
        Classification::Buy => "Strong fundamentals support acquisition consideration",
        Classification::Hold => "Suitable for patient investors seeking moderate returns",
        Classification::Watch => "Additional due diligence recommended before investment decision",
    });

    out.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn austin_mid() -> SignalSet {
        let mut s = SignalSet::neutral("TX-1", as_of());
        s.city = Some("Austin".to_string());
        s.primary_valuation = Some(340_011.0);
        s.valuation_band = Some(ValuationBand::Mid);
        s.property_age = Some(12);
        s.flood_risk = FloodRisk::Low;
        s
    }

    #[test]
    fn test_summary_template() {
        let text = summary(&austin_mid(), Classification::Buy, 90);
        assert_eq!(
            text,
            "This property presents attractive fundamentals with a valuation of $340,011 in Austin. \
             Built 12 years ago, this individually-owned property is a strong investment opportunity. \
             Low flood risk enhances investment appeal. Investment score: 90/100."
        );
    }

    #[test]
    fn test_summary_with_unknowns() {
        let s = SignalSet::neutral("X", as_of());
        let text = summary(&s, Classification::Hold, 55);
        assert!(text.contains("valuation of undisclosed in an undisclosed location"));
        assert!(text.contains("With an unknown construction year"));
        assert!(text.contains("Flood exposure could not be assessed."));
        assert!(text.ends_with("Investment score: 55/100."));
    }

    #[test]
    fn test_insight_order() {
        let got = insights(&austin_mid(), Classification::Buy);
        assert_eq!(
            got,
            vec![
                "Mid-market valuation balances opportunity with manageable risk",
                "Prime property age combines modern amenities with established value",
                "Individual ownership typical for owner-occupied or personal investment",
                "Low flood risk enhances long-term value stability",
                "Strong fundamentals support acquisition consideration",
            ]
        );
    }

    #[test]
    fn test_insights_never_empty_and_capped() {
        let bare = SignalSet::neutral("X", as_of());
        let got = insights(&bare, Classification::Watch);
        assert!(!got.is_empty());
        assert_eq!(
            got.last().map(String::as_str),
            Some("Additional due diligence recommended before investment decision")
        );

        let mut busy = austin_mid();
        busy.absentee_owner = true;
        busy.recent_sale = true;
        busy.loan_maturity = NaiveDate::from_ymd_opt(2027, 1, 1);
        let got = insights(&busy, Classification::Buy);
        assert_eq!(got.len(), MAX_SIGNAL_INSIGHTS + 1);
        assert_eq!(got[4], "Absentee owner may be more receptive to acquisition offers");
        assert_eq!(got[5], "Strong fundamentals support acquisition consideration");
    }

    #[test]
    fn test_mature_age_has_no_age_insight() {
        let mut s = austin_mid();
        s.property_age = Some(30);
        let got = insights(&s, Classification::Hold);
        assert!(!got.iter().any(|i| i.contains("property age") || i.contains("construction")));
    }
}
