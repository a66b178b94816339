// src/aggregate.rs

use std::collections::{BTreeMap, HashSet};

use mongodb::bson::{to_document, Document};
use serde::{Deserialize, Serialize};
//
use crate::error::Result;
use crate::normalize::NormalizedObservation;
use crate::observation::GroupKey;

/// Metrics stored alongside the group key in each summary document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    #[serde(rename = "totalCount")]
    pub total_count: i64,
    #[serde(rename = "listedCount")]
    pub listed_count: i64,
    #[serde(rename = "availableCount")]
    pub available_count: i64,
    #[serde(rename = "MRP")]
    pub mrp: Option<f64>,
    #[serde(rename = "Selling_Price")]
    pub selling_price: Option<f64>,
    #[serde(rename = "Discount")]
    pub discount: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRecord {
    pub key: GroupKey,
    pub metrics: SummaryMetrics,
}

impl SummaryRecord {
    /// The full summary document: the nine key fields followed by the metrics.
    pub fn to_document(&self) -> Result<Document> {
        let mut document = self.key.to_filter();
        document.extend(to_document(&self.metrics)?);

        Ok(document)
    }
}

/// Keeps the first row seen for each (group key, pincode) pair.
pub fn dedup(rows: Vec<NormalizedObservation>) -> Vec<NormalizedObservation> {
    let mut seen = HashSet::with_capacity(rows.len());

    rows.into_iter()
        .filter(|row| seen.insert((row.key.clone(), row.pincode.clone())))
        .collect()
}

/// Mean over present values only.
#[derive(Clone, Copy, Debug, Default)]
struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Accumulator {
    total: i64,
    listed: i64,
    available: i64,
    mrp: Mean,
    selling_price: Mean,
    discount: Mean,
}

impl Accumulator {
    fn push(&mut self, row: &NormalizedObservation) {
        self.total += 1;
        self.listed += i64::from(row.listed);
        self.available += i64::from(row.available);
        self.mrp.push(row.mrp);
        self.selling_price.push(row.selling_price);
        self.discount.push(row.discount);
    }

    fn finish(self) -> SummaryMetrics {
        SummaryMetrics {
            total_count: self.total,
            listed_count: self.listed,
            available_count: self.available,
            mrp: self.mrp.value(),
            selling_price: self.selling_price.value(),
            discount: self.discount.value(),
        }
    }
}

/// Groups de-duplicated rows by key. Each key appears once; output is sorted by key.
pub fn aggregate(rows: &[NormalizedObservation]) -> Vec<SummaryRecord> {
    let mut groups: BTreeMap<&GroupKey, Accumulator> = BTreeMap::new();

    for row in rows {
        groups.entry(&row.key).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(key, accumulator)| SummaryRecord {
            key: key.clone(),
            metrics: accumulator.finish(),
        })
        .collect()
}
