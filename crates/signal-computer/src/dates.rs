use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse the date shapes seen in recorder and assessor exports.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Loan start date plus a term in years, using 365-day years.
pub fn add_term_years(start: NaiveDate, years: f64) -> Option<NaiveDate> {
    if years.is_nan() || years <= 0.0 || years > 100.0 {
        return None;
    }
    start.checked_add_signed(Duration::days((years * 365.0) as i64))
}
