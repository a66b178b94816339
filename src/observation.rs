// src/observation.rs

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use mongodb::bson::{Bson, Document};

pub const CITY: &str = "City";
pub const COMPANY: &str = "Company";
pub const CLIENT_NAME: &str = "Client_Name";
pub const BRAND: &str = "Brand";
pub const NAME: &str = "Name";
pub const UNIQUE_PRODUCT_ID: &str = "Unique_Product_ID";
pub const PLATFORM: &str = "Platform";
pub const CATEGORY: &str = "Category";
pub const REPORT_DATE: &str = "Report_Date";
//
pub const PINCODE: &str = "Pincode";
pub const AVAILABILITY: &str = "Availability";
pub const MRP: &str = "MRP";
pub const SELLING_PRICE: &str = "Selling_Price";
pub const DISCOUNT: &str = "Discount";

/// Fields identifying one summary row, in index order.
pub const GROUP_KEY_FIELDS: [&str; 9] = [
    CITY,
    COMPANY,
    CLIENT_NAME,
    BRAND,
    NAME,
    UNIQUE_PRODUCT_ID,
    PLATFORM,
    CATEGORY,
    REPORT_DATE,
];

/// Every field read from the raw collection.
pub const PROJECTED_FIELDS: [&str; 14] = [
    CITY,
    COMPANY,
    CLIENT_NAME,
    BRAND,
    NAME,
    UNIQUE_PRODUCT_ID,
    MRP,
    SELLING_PRICE,
    DISCOUNT,
    AVAILABILITY,
    PINCODE,
    PLATFORM,
    CATEGORY,
    REPORT_DATE,
];

/// An opaque field value used for grouping.
///
/// Equality, hashing and ordering go through a canonical rendering. Numbers
/// compare by value across Int32, Int64 and Double, as MongoDB compares them
/// (`7`, `7i64` and `7.0` are one key). Everything else compares by type and
/// content, so `400001` and `"400001"` stay different keys.
#[derive(Clone, Debug)]
pub struct KeyPart {
    value: Bson,
    repr: String,
}

impl KeyPart {
    pub fn new(value: Bson) -> Self {
        let repr = key_repr(&value);

        Self { value, repr }
    }

    pub fn value(&self) -> &Bson {
        &self.value
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.value, Bson::Null | Bson::Undefined)
    }
}

fn key_repr(value: &Bson) -> String {
    match value {
        Bson::Int32(number) => format!("n:{number}"),
        Bson::Int64(number) => format!("n:{number}"),
        Bson::Double(number) => double_repr(*number),
        other => other.clone().into_canonical_extjson().to_string(),
    }
}

// Integral doubles render like the matching integer.
fn double_repr(number: f64) -> String {
    if number.is_nan() {
        "n:NaN".to_string()
    } else if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        format!("n:{}", number as i64)
    } else {
        format!("n:{number:?}")
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repr.hash(state);
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        self.repr.cmp(&other.repr)
    }
}

impl From<Bson> for KeyPart {
    fn from(value: Bson) -> Self {
        Self::new(value)
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::new(Bson::String(value.to_string()))
    }
}

/// The nine-field group key, ordered as [`GROUP_KEY_FIELDS`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey([KeyPart; 9]);

impl GroupKey {
    pub fn new(parts: [KeyPart; 9]) -> Self {
        Self(parts)
    }

    pub fn from_document(document: &Document) -> Self {
        Self(GROUP_KEY_FIELDS.map(|field| field_value(document, field)))
    }

    pub fn parts(&self) -> &[KeyPart; 9] {
        &self.0
    }

    /// Match filter for the summary collection; also the key half of a summary document.
    pub fn to_filter(&self) -> Document {
        GROUP_KEY_FIELDS
            .iter()
            .zip(self.0.iter())
            .map(|(field, part)| (field.to_string(), part.value().clone()))
            .collect()
    }
}

/// One row of the raw collection, restricted to the projected fields.
/// Absent fields are `Bson::Null`.
#[derive(Clone, Debug)]
pub struct RawObservation {
    pub key: GroupKey,
    pub pincode: KeyPart,
    pub availability: Bson,
    pub mrp: Bson,
    pub selling_price: Bson,
    pub discount: Bson,
}

impl RawObservation {
    pub fn from_document(document: &Document) -> Self {
        Self {
            key: GroupKey::from_document(document),
            pincode: field_value(document, PINCODE),
            availability: raw_value(document, AVAILABILITY),
            mrp: raw_value(document, MRP),
            selling_price: raw_value(document, SELLING_PRICE),
            discount: raw_value(document, DISCOUNT),
        }
    }
}

fn raw_value(document: &Document, field: &str) -> Bson {
    document.get(field).cloned().unwrap_or(Bson::Null)
}

fn field_value(document: &Document, field: &str) -> KeyPart {
    KeyPart::new(raw_value(document, field))
}
