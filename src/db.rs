// src/db.rs

use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, Document},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use tracing::info;
//
use crate::error::{Result, SummaryError};
use crate::upsert::{SummaryStore, UpsertOp, DEFAULT_BATCH_SIZE};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub uri: String,
    pub db_name: String,
    pub raw_collection: String,
    pub summary_collection: String,
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            db_name: "pinsight".to_string(),
            raw_collection: "products".to_string(),
            summary_collection: "products_summary".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Reads `MONGO_URI`, `DB_NAME`, `RAW_COLLECTION`, `SUMMARY_COLLECTION`
    /// and `BATCH_SIZE` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or empty keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let batch_size = match lookup("BATCH_SIZE") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(SummaryError::Config(format!(
                        "BATCH_SIZE must be a positive integer, got '{}'",
                        value
                    )))
                }
            },
            None => defaults.batch_size,
        };

        Ok(Self {
            uri: lookup("MONGO_URI").unwrap_or(defaults.uri),
            db_name: lookup("DB_NAME").unwrap_or(defaults.db_name),
            raw_collection: lookup("RAW_COLLECTION").unwrap_or(defaults.raw_collection),
            summary_collection: lookup("SUMMARY_COLLECTION").unwrap_or(defaults.summary_collection),
            batch_size,
        })
    }
}

#[derive(Clone, Debug)]
pub struct DB {
    pub client: Client,
    database: Database,
    summary_collection: String,
}

impl DB {
    pub async fn new(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let database = client.database(&config.db_name);

        info!(db = %config.db_name, "connected to MongoDB");

        Ok(Self {
            client,
            database,
            summary_collection: config.summary_collection.clone(),
        })
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    pub fn summary_collection(&self) -> Collection<Document> {
        self.collection(&self.summary_collection)
    }
}

#[async_trait]
impl SummaryStore for DB {
    // The 2.x driver has no client-side bulk write, so each batch goes out as
    // one ordered `update` command.
    async fn write_batch(&self, batch: usize, ops: &[UpsertOp]) -> Result<()> {
        let command = update_command(&self.summary_collection, ops);
        let reply = self.database.run_command(command, None).await?;

        let errors = write_errors(&reply);
        if !errors.is_empty() {
            return Err(SummaryError::BulkWrite {
                collection: self.summary_collection.clone(),
                batch,
                errors: errors.join("; "),
            });
        }

        Ok(())
    }

    async fn ensure_unique_index(&self, fields: &[&str]) -> Result<()> {
        self.summary_collection()
            .create_index(unique_index(fields), None)
            .await?;

        Ok(())
    }
}

/// Ascending unique index over `fields`. Left unnamed so the server derives
/// `City_1_Company_1_...`, matching an index created earlier by another writer.
fn unique_index(fields: &[&str]) -> IndexModel {
    let keys: Document = fields
        .iter()
        .map(|field| (field.to_string(), Bson::Int32(1)))
        .collect();

    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// One ordered `update` command upserting every op of a batch.
fn update_command(collection: &str, ops: &[UpsertOp]) -> Document {
    let updates: Vec<Document> = ops
        .iter()
        .map(|op| doc! { "q": op.filter.clone(), "u": op.update.clone(), "upsert": true })
        .collect();

    doc! {
        "update": collection,
        "updates": updates,
        "ordered": true,
    }
}

/// Write errors reported inside an otherwise successful command reply.
fn write_errors(reply: &Document) -> Vec<String> {
    let mut errors: Vec<String> = reply
        .get_array("writeErrors")
        .map(|entries| {
            entries
                .iter()
                .filter_map(Bson::as_document)
                .map(|entry| {
                    format!(
                        "op {}: code {}: {}",
                        entry.get("index").cloned().unwrap_or(Bson::Null),
                        entry.get("code").cloned().unwrap_or(Bson::Null),
                        entry.get_str("errmsg").unwrap_or("unknown error"),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if let Ok(concern) = reply.get_document("writeConcernError") {
        errors.push(format!(
            "write concern: {}",
            concern.get_str("errmsg").unwrap_or("unknown error")
        ));
    }

    errors
}
