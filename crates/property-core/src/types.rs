use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{AnalysisError, DataIssue};

/// A raw attribute as it arrives from CSV imports or ORM rows: usually a
/// number, sometimes a formatted string, occasionally something else entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    Other(serde_json::Value),
}

impl RawField {
    /// Numeric value, accepting strings like `"$340,011"` or `" 1995 "`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawField::Number(n) => *n,
            RawField::Text(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$') && !c.is_whitespace())
                    .collect();
                cleaned.parse::<f64>().ok()?
            }
            RawField::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Whole-number value; `"1995.0"` is accepted, `"1995.5"` is not.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
    }

    /// True for empty strings and the `"None"`/`"null"` placeholders some
    /// exports write instead of leaving the cell blank.
    pub fn is_blank(&self) -> bool {
        match self {
            RawField::Text(s) => {
                let t = s.trim();
                t.is_empty() || t.eq_ignore_ascii_case("none") || t.eq_ignore_ascii_case("null")
            }
            RawField::Other(v) => v.is_null(),
            RawField::Number(_) => false,
        }
    }

    pub fn display(&self) -> String {
        match self {
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s.clone(),
            RawField::Other(v) => v.to_string(),
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

/// Raw property attributes joined from tax assessor, AVM and recorder rows.
///
/// Field aliases accept the ATTOM-style column names used by the ingest
/// pipeline, so rows can be posted as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct PropertyRecord {
    #[serde(alias = "attom_id", deserialize_with = "deserialize_property_id")]
    pub property_id: String,
    #[serde(alias = "property_address_full")]
    pub address_full: Option<String>,
    #[serde(alias = "property_address_city")]
    pub city: Option<String>,
    #[serde(alias = "property_address_state")]
    pub state: Option<String>,
    #[serde(alias = "property_address_zip")]
    pub zip: Option<String>,
    #[serde(alias = "property_latitude")]
    pub latitude: Option<RawField>,
    #[serde(alias = "property_longitude")]
    pub longitude: Option<RawField>,
    /// Automated valuation model estimate
    pub estimated_value: Option<RawField>,
    #[serde(alias = "tax_market_value_total")]
    pub tax_market_value: Option<RawField>,
    #[serde(alias = "tax_assessed_value_total")]
    pub tax_assessed_value: Option<RawField>,
    pub year_built: Option<RawField>,
    pub area_lot_sf: Option<RawField>,
    #[serde(alias = "party_owner1_name_full")]
    pub owner1_name: Option<String>,
    #[serde(alias = "party_owner2_name_full")]
    pub owner2_name: Option<String>,
    #[serde(alias = "contact_owner_mail_address_full")]
    pub owner_mail_address: Option<String>,
    #[serde(alias = "fema_zone")]
    pub flood_zone: Option<String>,
    #[serde(alias = "mortgage1_term_date")]
    pub loan_maturity_date: Option<String>,
    #[serde(alias = "instrument_date")]
    pub loan_date: Option<String>,
    #[serde(alias = "mortgage1_term")]
    pub loan_term_years: Option<RawField>,
    #[serde(alias = "assessor_last_sale_date")]
    pub last_sale_date: Option<String>,
    #[serde(alias = "assessor_last_sale_amount")]
    pub last_sale_amount: Option<RawField>,
}

impl PropertyRecord {
    pub fn new(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            ..Default::default()
        }
    }

    /// Decode one record from untyped JSON. `null` is an absent record; a
    /// value that is not a readable record is an `InvalidRecord` error so
    /// callers can report it per entry instead of failing a whole batch.
    pub fn from_json(value: serde_json::Value) -> Result<Option<Self>, AnalysisError> {
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AnalysisError::InvalidRecord(format!("unreadable property record: {e}")))
    }

    /// Best-effort identifier from untyped JSON, for reporting records that
    /// could not be decoded.
    pub fn id_hint(value: &serde_json::Value) -> String {
        ["property_id", "attom_id"]
            .iter()
            .find_map(|key| value.get(*key).and_then(id_from_json))
            .unwrap_or_default()
    }

    /// Whether the record carries anything the signal computer can use.
    /// A bare identifier (or nothing at all) is not enough to analyze.
    pub fn has_scoring_inputs(&self) -> bool {
        let present = |f: &Option<RawField>| f.as_ref().is_some_and(|v| !v.is_blank());
        let text = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());

        present(&self.estimated_value)
            || present(&self.tax_market_value)
            || present(&self.tax_assessed_value)
            || present(&self.year_built)
            || text(&self.owner1_name)
            || text(&self.owner2_name)
            || text(&self.flood_zone)
    }
}

/// ATTOM ids are numeric strings and often arrive as JSON numbers.
fn id_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => u.to_string(),
            (None, Some(i), _) => i.to_string(),
            (None, None, Some(f)) if f.fract() == 0.0 => format!("{f:.0}"),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

fn deserialize_property_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(value) => id_from_json(&value)
            .ok_or_else(|| de::Error::custom(format!("property id must be a string or number, got {value}"))),
    }
}

/// Valuation band of the primary valuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ValuationBand {
    Low,
    Mid,
    High,
}

impl ValuationBand {
    pub const LOW_CEILING: f64 = 250_000.0;
    pub const HIGH_FLOOR: f64 = 750_000.0;

    /// Low below 250K, Mid from 250K to 750K inclusive, High above 750K.
    pub fn from_valuation(value: f64) -> Self {
        if value < Self::LOW_CEILING {
            ValuationBand::Low
        } else if value <= Self::HIGH_FLOOR {
            ValuationBand::Mid
        } else {
            ValuationBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationBand::Low => "Low",
            ValuationBand::Mid => "Mid",
            ValuationBand::High => "High",
        }
    }
}

/// Who holds title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum OwnershipType {
    #[default]
    Individual,
    #[serde(rename = "LLC")]
    Llc,
    Corporation,
}

impl OwnershipType {
    pub fn is_entity(&self) -> bool {
        matches!(self, OwnershipType::Llc | OwnershipType::Corporation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipType::Individual => "Individual",
            OwnershipType::Llc => "LLC",
            OwnershipType::Corporation => "Corporation",
        }
    }

    /// Adjective used in prose, e.g. "this LLC-owned property".
    pub fn owned_label(&self) -> &'static str {
        match self {
            OwnershipType::Individual => "individually",
            OwnershipType::Llc => "LLC",
            OwnershipType::Corporation => "corporate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FloodRisk {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl FloodRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloodRisk::Low => "Low",
            FloodRisk::Medium => "Medium",
            FloodRisk::High => "High",
            FloodRisk::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AgeCategory {
    New,
    Recent,
    Mature,
    Old,
    #[default]
    Unknown,
}

impl AgeCategory {
    pub fn from_age(age: Option<u32>) -> Self {
        match age {
            Some(a) if a < 5 => AgeCategory::New,
            Some(a) if a <= 20 => AgeCategory::Recent,
            Some(a) if a <= 40 => AgeCategory::Mature,
            Some(_) => AgeCategory::Old,
            None => AgeCategory::Unknown,
        }
    }
}

/// Derived, normalized attributes of one property. Produced by the signal
/// computer and consumed by every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SignalSet {
    pub property_id: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub primary_valuation: Option<f64>,
    pub valuation_band: Option<ValuationBand>,
    pub ownership_type: OwnershipType,
    pub property_age: Option<u32>,
    pub age_category: AgeCategory,
    pub flood_risk: FloodRisk,
    pub loan_maturity: Option<NaiveDate>,
    pub absentee_owner: bool,
    pub multiple_owners: bool,
    pub value_per_sf: Option<f64>,
    pub days_since_sale: Option<i64>,
    pub recent_sale: bool,
    /// Reference date all date arithmetic was done against
    pub as_of: NaiveDate,
    #[serde(default)]
    pub issues: Vec<DataIssue>,
}

impl SignalSet {
    /// An empty signal set: every signal unknown or at its neutral default.
    pub fn neutral(property_id: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            property_id: property_id.into(),
            address: None,
            city: None,
            latitude: None,
            longitude: None,
            primary_valuation: None,
            valuation_band: None,
            ownership_type: OwnershipType::Individual,
            property_age: None,
            age_category: AgeCategory::Unknown,
            flood_risk: FloodRisk::Unknown,
            loan_maturity: None,
            absentee_owner: false,
            multiple_owners: false,
            value_per_sf: None,
            days_since_sale: None,
            recent_sale: false,
            as_of,
            issues: Vec::new(),
        }
    }

    /// Months until the loan matures, negative if already past.
    pub fn months_to_loan_maturity(&self) -> Option<i64> {
        self.loan_maturity
            .map(|d| (d - self.as_of).num_days() * 12 / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valuation_band_boundaries() {
        assert_eq!(ValuationBand::from_valuation(249_999.99), ValuationBand::Low);
        assert_eq!(ValuationBand::from_valuation(250_000.0), ValuationBand::Mid);
        assert_eq!(ValuationBand::from_valuation(750_000.0), ValuationBand::Mid);
        assert_eq!(ValuationBand::from_valuation(750_000.01), ValuationBand::High);
    }

    #[test]
    fn test_raw_field_parsing() {
        assert_eq!(RawField::from("$340,011").as_f64(), Some(340_011.0));
        assert_eq!(RawField::from(" 1995 ").as_i64(), Some(1995));
        assert_eq!(RawField::from("1995.0").as_i64(), Some(1995));
        assert_eq!(RawField::from("1995.5").as_i64(), None);
        assert_eq!(RawField::from("n/a").as_f64(), None);
        assert_eq!(RawField::Number(f64::NAN).as_f64(), None);
        assert_eq!(RawField::Other(serde_json::json!(true)).as_f64(), None);
        assert!(RawField::from("None").is_blank());
        assert!(!RawField::Number(0.0).is_blank());
    }

    #[test]
    fn test_numeric_property_id() {
        let record: PropertyRecord =
            serde_json::from_value(serde_json::json!({"attom_id": 12345, "year_built": 1990})).unwrap();
        assert_eq!(record.property_id, "12345");

        let record: PropertyRecord =
            serde_json::from_value(serde_json::json!({"property_id": 777.0})).unwrap();
        assert_eq!(record.property_id, "777");

        let record: PropertyRecord = serde_json::from_value(serde_json::json!({"attom_id": null})).unwrap();
        assert_eq!(record.property_id, "");
    }

    #[test]
    fn test_from_json_reports_unreadable_records() {
        assert_eq!(PropertyRecord::from_json(serde_json::Value::Null).unwrap(), None);

        let bad = serde_json::json!({"attom_id": 55, "address_full": 123});
        assert!(matches!(
            PropertyRecord::from_json(bad.clone()),
            Err(AnalysisError::InvalidRecord(msg)) if msg.starts_with("unreadable property record")
        ));
        assert_eq!(PropertyRecord::id_hint(&bad), "55");
        assert_eq!(PropertyRecord::id_hint(&serde_json::json!("not an object")), "");
        assert!(PropertyRecord::from_json(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_record_accepts_attom_column_names() {
        let record: PropertyRecord = serde_json::from_value(serde_json::json!({
            "attom_id": "TX-1001",
            "property_address_full": "123 Main St",
            "property_address_city": "Austin",
            "tax_market_value_total": "340,011",
            "year_built": 1998,
            "party_owner1_name_full": "JANE DOE",
            "area_lot_sf": {"unexpected": "shape"}
        }))
        .unwrap();

        assert_eq!(record.property_id, "TX-1001");
        assert_eq!(record.city.as_deref(), Some("Austin"));
        assert_eq!(
            record.tax_market_value.as_ref().and_then(RawField::as_f64),
            Some(340_011.0)
        );
        assert_eq!(record.year_built.as_ref().and_then(RawField::as_i64), Some(1998));
        assert!(matches!(record.area_lot_sf, Some(RawField::Other(_))));
        assert!(record.has_scoring_inputs());
    }

    #[test]
    fn test_bare_identifier_has_no_scoring_inputs() {
        let mut record = PropertyRecord::new("EMPTY");
        assert!(!record.has_scoring_inputs());
        record.year_built = Some(RawField::from(""));
        assert!(!record.has_scoring_inputs());
        record.flood_zone = Some("X".to_string());
        assert!(record.has_scoring_inputs());
    }

    #[test]
    fn test_age_category() {
        assert_eq!(AgeCategory::from_age(Some(0)), AgeCategory::New);
        assert_eq!(AgeCategory::from_age(Some(5)), AgeCategory::Recent);
        assert_eq!(AgeCategory::from_age(Some(20)), AgeCategory::Recent);
        assert_eq!(AgeCategory::from_age(Some(21)), AgeCategory::Mature);
        assert_eq!(AgeCategory::from_age(Some(41)), AgeCategory::Old);
        assert_eq!(AgeCategory::from_age(None), AgeCategory::Unknown);
    }

    #[test]
    fn test_ownership_serializes_llc_label() {
        let json = serde_json::to_string(&OwnershipType::Llc).unwrap();
        assert_eq!(json, "\"LLC\"");
    }

    #[test]
    fn test_months_to_loan_maturity() {
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut signals = SignalSet::neutral("P1", as_of);
        assert_eq!(signals.months_to_loan_maturity(), None);
        signals.loan_maturity = NaiveDate::from_ymd_opt(2027, 1, 1);
        assert_eq!(signals.months_to_loan_maturity(), Some(12));
    }
}
