// src/extract.rs

use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
};
use tracing::info;
//
use crate::db::DB;
use crate::error::Result;
use crate::observation::{RawObservation, PROJECTED_FIELDS};

/// Projection onto the fourteen fields the summary needs, without `_id`.
pub fn projection() -> Document {
    let mut projection = doc! { "_id": 0 };

    for field in PROJECTED_FIELDS {
        projection.insert(field, 1);
    }

    projection
}

/// Reads every document of `collection_name`. Missing fields come back as null;
/// nothing is validated here.
pub async fn extract(db: &DB, collection_name: &str) -> Result<Vec<RawObservation>> {
    let collection = db.collection(collection_name);
    let find_options = FindOptions::builder().projection(projection()).build();

    let mut cursor = collection.find(doc! {}, find_options).await?;
    let mut rows = Vec::new();

    while let Some(document) = cursor.try_next().await? {
        rows.push(RawObservation::from_document(&document));
    }

    info!(collection = collection_name, rows = rows.len(), "extracted raw observations");

    Ok(rows)
}
