// src/upsert.rs

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use tracing::debug;
//
use crate::aggregate::SummaryRecord;
use crate::error::Result;
use crate::observation::GROUP_KEY_FIELDS;

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// One `updateOne`-style upsert: match on the group key, `$set` the full record.
#[derive(Clone, Debug, PartialEq)]
pub struct UpsertOp {
    pub filter: Document,
    pub update: Document,
}

impl UpsertOp {
    pub fn from_record(record: &SummaryRecord) -> Result<Self> {
        Ok(Self {
            filter: record.key.to_filter(),
            update: doc! { "$set": record.to_document()? },
        })
    }
}

/// Write side of the summary collection.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Applies one batch of upserts in order. `batch` is the 1-based batch number.
    async fn write_batch(&self, batch: usize, ops: &[UpsertOp]) -> Result<()>;

    /// Creates a unique ascending index over `fields`; a no-op when it already exists.
    async fn ensure_unique_index(&self, fields: &[&str]) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub records: usize,
    pub batches: usize,
}

/// Buffers upserts and flushes them whenever `batch_size` is reached.
/// [`Upserter::finish`] flushes whatever is left.
pub struct Upserter<'a, S: SummaryStore + ?Sized> {
    store: &'a S,
    batch_size: usize,
    buffer: Vec<UpsertOp>,
    stats: UpsertStats,
}

impl<'a, S: SummaryStore + ?Sized> Upserter<'a, S> {
    pub fn new(store: &'a S, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);

        Self {
            store,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            stats: UpsertStats::default(),
        }
    }

    pub async fn push(&mut self, op: UpsertOp) -> Result<()> {
        self.buffer.push(op);
        self.stats.records += 1;

        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }

        Ok(())
    }

    pub async fn finish(mut self) -> Result<UpsertStats> {
        if !self.buffer.is_empty() {
            self.flush().await?;
        }

        Ok(self.stats)
    }

    async fn flush(&mut self) -> Result<()> {
        let batch = self.stats.batches + 1;
        debug!(batch, ops = self.buffer.len(), "flushing upsert batch");

        self.store.write_batch(batch, &self.buffer).await?;

        self.stats.batches = batch;
        self.buffer.clear();

        Ok(())
    }
}

/// Upserts every record, then makes sure the unique group-key index exists.
pub async fn upsert_summaries<S: SummaryStore + ?Sized>(
    store: &S,
    records: &[SummaryRecord],
    batch_size: usize,
) -> Result<UpsertStats> {
    let mut upserter = Upserter::new(store, batch_size);

    for record in records {
        upserter.push(UpsertOp::from_record(record)?).await?;
    }

    let stats = upserter.finish().await?;

    store.ensure_unique_index(&GROUP_KEY_FIELDS).await?;

    Ok(stats)
}
