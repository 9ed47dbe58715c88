//! Signal computation: raw property attributes in, normalized signals out.
//!
//! Everything here is a pure function of the record and the computer's
//! reference date. Missing or malformed inputs never fail; they leave the
//! affected signal unknown and add a [`DataIssue`] to the signal set.

pub mod dates;
pub mod flood;
pub mod ownership;

use chrono::{Datelike, NaiveDate, Utc};
use property_core::{
    AgeCategory, DataIssue, FloodRisk, PropertyRecord, RawField, SignalSet, ValuationBand,
};

pub use flood::flood_risk_from_zone;
pub use ownership::{classify_owner_name, classify_ownership};

const EARLIEST_YEAR_BUILT: i64 = 1800;
const RECENT_SALE_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct SignalComputer {
    as_of: NaiveDate,
}

impl Default for SignalComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalComputer {
    /// Computer anchored to today's date (UTC).
    pub fn new() -> Self {
        Self::with_reference_date(Utc::now().date_naive())
    }

    /// Computer anchored to a fixed date, so ages and day counts are reproducible.
    pub fn with_reference_date(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.as_of
    }

    /// Compute all derived signals for a single property.
    pub fn compute(&self, record: &PropertyRecord) -> SignalSet {
        let mut signals = SignalSet::neutral(record.property_id.trim(), self.as_of);
        signals.address = non_blank(record.address_full.as_deref());
        signals.city = non_blank(record.city.as_deref());
        signals.latitude = coordinate(record.latitude.as_ref(), 90.0);
        signals.longitude = coordinate(record.longitude.as_ref(), 180.0);

        self.valuation_signals(record, &mut signals);
        self.ownership_signals(record, &mut signals);
        self.age_signals(record, &mut signals);
        self.flood_signals(record, &mut signals);
        self.loan_signals(record, &mut signals);
        self.market_signals(record, &mut signals);

        if !signals.issues.is_empty() {
            tracing::debug!(
                property_id = %signals.property_id,
                issues = signals.issues.len(),
                "Signals derived with data issues"
            );
        }
        signals
    }

    /// Compute signals for multiple properties, preserving order.
    pub fn compute_batch(&self, records: &[PropertyRecord]) -> Vec<SignalSet> {
        records.iter().map(|r| self.compute(r)).collect()
    }

    fn valuation_signals(&self, record: &PropertyRecord, signals: &mut SignalSet) {
        // AVM estimate first, then tax market value, then assessed value
        let candidates = [
            ("estimated_value", &record.estimated_value),
            ("tax_market_value", &record.tax_market_value),
            ("tax_assessed_value", &record.tax_assessed_value),
        ];

        let mut primary = None;
        for (name, field) in candidates {
            if let Some(value) = read_numeric(name, field.as_ref(), &mut signals.issues) {
                if value > 0.0 {
                    primary = Some(value);
                    break;
                }
            }
        }

        match primary {
            Some(value) => {
                signals.primary_valuation = Some(value);
                signals.valuation_band = Some(ValuationBand::from_valuation(value));

                let lot_sf = read_numeric("area_lot_sf", record.area_lot_sf.as_ref(), &mut signals.issues);
                signals.value_per_sf = lot_sf.filter(|sf| *sf > 0.0).map(|sf| value / sf);
            }
            None => signals.issues.push(DataIssue::missing("valuation")),
        }
    }

    fn ownership_signals(&self, record: &PropertyRecord, signals: &mut SignalSet) {
        let (ownership, issues) =
            classify_ownership(record.owner1_name.as_deref(), record.owner2_name.as_deref());
        signals.ownership_type = ownership;
        signals.issues.extend(issues);

        signals.multiple_owners = non_blank(record.owner2_name.as_deref()).is_some();
        signals.absentee_owner = match (
            non_blank(record.owner_mail_address.as_deref()),
            non_blank(record.address_full.as_deref()),
        ) {
            (Some(mail), Some(site)) => normalize_address(&mail) != normalize_address(&site),
            _ => false,
        };
    }

    fn age_signals(&self, record: &PropertyRecord, signals: &mut SignalSet) {
        let current_year = self.as_of.year() as i64;
        let Some(field) = record.year_built.as_ref().filter(|f| !f.is_blank()) else {
            signals.issues.push(DataIssue::missing("year_built"));
            return;
        };

        match field.as_i64() {
            Some(year) if year > EARLIEST_YEAR_BUILT && year <= current_year => {
                let age = (current_year - year) as u32;
                signals.property_age = Some(age);
                signals.age_category = AgeCategory::from_age(Some(age));
            }
            _ => signals
                .issues
                .push(DataIssue::unparseable("year_built", field.display())),
        }
    }

    fn flood_signals(&self, record: &PropertyRecord, signals: &mut SignalSet) {
        match non_blank(record.flood_zone.as_deref()) {
            Some(zone) => {
                signals.flood_risk = flood_risk_from_zone(&zone);
                if signals.flood_risk == FloodRisk::Unknown {
                    signals.issues.push(DataIssue::unparseable("flood_zone", zone));
                }
            }
            // No flood data source for this property
            None => signals.issues.push(DataIssue::missing("flood_zone")),
        }
    }

    fn loan_signals(&self, record: &PropertyRecord, signals: &mut SignalSet) {
        if let Some(date) = record.loan_maturity_date.as_deref().and_then(dates::parse_date) {
            signals.loan_maturity = Some(date);
            return;
        }

        let start = record.loan_date.as_deref().and_then(dates::parse_date);
        let term = record.loan_term_years.as_ref().and_then(RawField::as_f64);
        signals.loan_maturity = match (start, term) {
            (Some(start), Some(years)) => dates::add_term_years(start, years),
            _ => None,
        };
    }

    fn market_signals(&self, record: &PropertyRecord, signals: &mut SignalSet) {
        let days = record
            .last_sale_date
            .as_deref()
            .and_then(dates::parse_date)
            .map(|sale| (self.as_of - sale).num_days())
            .filter(|d| *d >= 0);

        signals.days_since_sale = days;
        signals.recent_sale = days.is_some_and(|d| d < RECENT_SALE_DAYS);
    }
}

/// Read an optional numeric field. Blank is `None` without an issue (the
/// caller decides whether absence matters); garbage is `None` with one.
fn read_numeric(name: &str, field: Option<&RawField>, issues: &mut Vec<DataIssue>) -> Option<f64> {
    let field = field.filter(|f| !f.is_blank())?;
    let value = field.as_f64();
    if value.is_none() {
        issues.push(DataIssue::unparseable(name, field.display()));
    }
    value
}

fn coordinate(field: Option<&RawField>, limit: f64) -> Option<f64> {
    field
        .and_then(RawField::as_f64)
        .filter(|v| v.abs() <= limit && *v != 0.0)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn normalize_address(address: &str) -> String {
    address
        .to_uppercase()
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
