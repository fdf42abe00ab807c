// SPDX-License-Identifier: MIT

//! One-shot Strava → warehouse sync.
//!
//! Fetches run activities for the requested date window, stages them, and
//! merges them idempotently into the permanent `activities` table.

use clap::Parser;
use strava_sync::config::Config;
use strava_sync::db::Warehouse;
use strava_sync::services::SyncPipeline;

#[derive(Parser, Debug)]
#[command(name = "strava-sync", about = "Sync Strava run activities into the warehouse")]
struct Args {
    /// Start of the sync window (YYYY-MM-DD); defaults to 3 days ago.
    #[arg(long = "start_date")]
    start_date: Option<String>,

    /// End of the sync window (YYYY-MM-DD); defaults to tomorrow.
    #[arg(long = "end_date")]
    end_date: Option<String>,
}

#[tokio::main]
async fn main() {
    strava_sync::logging::init();
    let args = Args::parse();

    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "Sync failed");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> strava_sync::Result<()> {
    let config = Config::from_env()?;
    let warehouse = Warehouse::open(&config.warehouse_path)?;

    let pipeline = SyncPipeline::new(config, warehouse);
    let summary = pipeline
        .run(args.start_date.as_deref(), args.end_date.as_deref())
        .await?;

    tracing::info!(
        fetched = summary.fetched_runs,
        merged = summary.merged_rows,
        "Done"
    );
    Ok(())
}
