// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("bulk upsert into '{collection}' rejected in batch {batch}: {errors}")]
    BulkWrite {
        collection: String,
        batch: usize,
        errors: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SummaryError>;
