// src/pipeline.rs

use chrono::{DateTime, Utc};
use tracing::{info, warn};
//
use crate::aggregate::{aggregate, dedup};
use crate::db::{Config, DB};
use crate::error::Result;
use crate::extract::extract;
use crate::normalize::normalize;
use crate::observation::RawObservation;
use crate::upsert::{upsert_summaries, SummaryStore};

#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub raw_rows: usize,
    pub deduped_rows: usize,
    pub groups_written: usize,
    pub batches: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.raw_rows == 0
    }
}

/// One full pass: read the raw collection, rebuild every summary row it covers.
pub async fn run(config: &Config, db: &DB) -> Result<RunReport> {
    let raw = extract(db, &config.raw_collection).await?;

    summarize(raw, db, config).await
}

/// Normalizes, de-duplicates, aggregates and upserts `raw` into `store`.
/// Empty input writes nothing and leaves the index alone.
pub async fn summarize<S: SummaryStore + ?Sized>(
    raw: Vec<RawObservation>,
    store: &S,
    config: &Config,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let raw_rows = raw.len();

    if raw.is_empty() {
        warn!(collection = %config.raw_collection, "no raw data found, skipping summary");

        return Ok(RunReport {
            raw_rows,
            deduped_rows: 0,
            groups_written: 0,
            batches: 0,
            started_at,
            finished_at: Utc::now(),
        });
    }

    let rows = dedup(normalize(raw));
    let summaries = aggregate(&rows);

    info!(raw_rows, deduped_rows = rows.len(), groups = summaries.len(), "aggregated summaries");

    let stats = upsert_summaries(store, &summaries, config.batch_size).await?;

    let report = RunReport {
        raw_rows,
        deduped_rows: rows.len(),
        groups_written: stats.records,
        batches: stats.batches,
        started_at,
        finished_at: Utc::now(),
    };

    info!(
        collection = %config.summary_collection,
        groups = report.groups_written,
        batches = report.batches,
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "upserted summary records"
    );

    Ok(report)
}
