// src/normalize.rs

use mongodb::bson::Bson;
//
use crate::observation::{GroupKey, KeyPart, RawObservation};

/// A raw observation with availability signals derived and prices coerced.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedObservation {
    pub key: GroupKey,
    pub pincode: KeyPart,
    pub listed: bool,
    pub available: bool,
    pub mrp: Option<f64>,
    pub selling_price: Option<f64>,
    pub discount: Option<f64>,
}

impl From<RawObservation> for NormalizedObservation {
    fn from(raw: RawObservation) -> Self {
        Self {
            listed: is_listed(&raw.availability),
            available: is_available(&raw.availability),
            mrp: coerce_numeric(&raw.mrp),
            selling_price: coerce_numeric(&raw.selling_price),
            discount: coerce_numeric(&raw.discount),
            key: raw.key,
            pincode: raw.pincode,
        }
    }
}

pub fn normalize(rows: Vec<RawObservation>) -> Vec<NormalizedObservation> {
    rows.into_iter().map(NormalizedObservation::from).collect()
}

/// Trimmed, lower-cased availability text. Non-string values are rendered
/// first, so `null` or a number never reads as "yes"/"no".
pub fn availability_text(value: &Bson) -> String {
    match value {
        Bson::String(text) => text.trim().to_lowercase(),
        // BSON rendering: a missing value reads "null", never "yes"/"no".
        other => other.to_string().trim().to_lowercase(),
    }
}

/// Availability was explicitly reported either way.
pub fn is_listed(value: &Bson) -> bool {
    matches!(availability_text(value).as_str(), "yes" | "no")
}

pub fn is_available(value: &Bson) -> bool {
    availability_text(value) == "yes"
}

/// Lenient numeric parse: anything that is not a number, or a string holding
/// one, is `None`. NaN counts as missing.
pub fn coerce_numeric(value: &Bson) -> Option<f64> {
    let number = match value {
        Bson::Double(number) => *number,
        Bson::Int32(number) => f64::from(*number),
        Bson::Int64(number) => *number as f64,
        Bson::String(text) => text.trim().parse::<f64>().ok()?,
        // Decimal128 and the rest are not coerced.
        _ => return None,
    };

    (!number.is_nan()).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, Decimal128};

    fn text(value: &str) -> Bson {
        Bson::String(value.to_string())
    }

    #[test]
    fn explicit_yes_or_no_is_listed() {
        for value in ["Yes", "yes", " YES ", "No", "no"] {
            assert!(is_listed(&text(value)), "{value:?} should be listed");
        }

        for value in [text(""), text("N/A"), text("Maybe"), Bson::Null, Bson::Int32(1)] {
            assert!(!is_listed(&value), "{value:?} should not be listed");
        }

        assert_eq!(availability_text(&Bson::Null), "null");
    }

    #[test]
    fn only_yes_is_available() {
        assert!(is_available(&text("Yes")));
        assert!(is_available(&text("\tyes\n")));

        for value in [text("no"), text("No"), text(""), text("yess"), Bson::Null, Bson::Boolean(true)] {
            assert!(!is_available(&value), "{value:?} should not be available");
        }
    }

    #[test]
    fn available_implies_listed() {
        for value in ["Yes", "no", "", "N/A", " yes", "NO "] {
            let value = text(value);
            assert!(!is_available(&value) || is_listed(&value));
        }
    }

    #[test]
    fn numeric_coercion_is_total() {
        assert_eq!(coerce_numeric(&text("12.5")), Some(12.5));
        assert_eq!(coerce_numeric(&Bson::Double(12.5)), Some(12.5));
        assert_eq!(coerce_numeric(&text(" 99 ")), Some(99.0));
        assert_eq!(coerce_numeric(&Bson::Int32(7)), Some(7.0));
        assert_eq!(coerce_numeric(&Bson::Int64(1_000)), Some(1000.0));

        assert_eq!(coerce_numeric(&text("")), None);
        assert_eq!(coerce_numeric(&text("abc")), None);
        assert_eq!(coerce_numeric(&text("NaN")), None);
        assert_eq!(coerce_numeric(&Bson::Double(f64::NAN)), None);
        assert_eq!(coerce_numeric(&Bson::Null), None);
        assert_eq!(coerce_numeric(&Bson::Boolean(true)), None);
    }

    #[test]
    fn decimal128_prices_are_missing() {
        let price = Bson::Decimal128(Decimal128::from_bytes([0; 16]));

        assert_eq!(coerce_numeric(&price), None);

        let row = NormalizedObservation::from(RawObservation::from_document(&doc! {
            "MRP": price,
            "Selling_Price": 90,
        }));
        assert_eq!(row.mrp, None);
        assert_eq!(row.selling_price, Some(90.0));
    }

    #[test]
    fn normalize_keeps_every_row() {
        let rows = vec![
            RawObservation::from_document(&doc! { "Availability": "Yes", "MRP": "100" }),
            RawObservation::from_document(&doc! { "Availability": "no", "MRP": "n/a" }),
            RawObservation::from_document(&doc! {}),
        ];

        let normalized = normalize(rows);

        assert_eq!(normalized.len(), 3);
        assert!(normalized[0].listed && normalized[0].available);
        assert_eq!(normalized[0].mrp, Some(100.0));
        assert!(normalized[1].listed && !normalized[1].available);
        assert_eq!(normalized[1].mrp, None);
        assert!(!normalized[2].listed && !normalized[2].available);
    }
}
