// src/main.rs

use anyhow::Context;
//
use pinsight_summary::{
    db::{Config, DB},
    logging::init_logging,
    pipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = init_logging();

    let config = Config::from_env().context("invalid configuration")?;
    let db = DB::new(&config)
        .await
        .with_context(|| format!("failed to connect to {}", config.db_name))?;

    let report = pipeline::run(&config, &db)
        .await
        .context("summary run aborted")?;

    if report.is_empty() {
        println!("No raw data found in collection '{}'", config.raw_collection);
        return Ok(());
    }

    println!(
        "Upserted {} summary records into '{}'.",
        report.groups_written, config.summary_collection
    );

    Ok(())
}
