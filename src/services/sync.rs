// SPDX-License-Identifier: MIT

//! One-shot sync pipeline.
//!
//! Strictly sequential: resolve window → refresh token → fetch runs →
//! stage → merge. Each stage fully completes or fails the run; failures
//! are never retried here because re-invoking the whole pipeline is safe
//! (the merge is idempotent on activity id).

use chrono::Utc;

use crate::config::Config;
use crate::db::Warehouse;
use crate::error::Result;
use crate::services::strava::{ActivityFetcher, StravaClient};
use crate::window::SyncWindow;

/// Outcome of a sync run, surfaced for logging.
#[derive(Debug, Clone, Copy)]
pub struct SyncSummary {
    pub fetched_runs: usize,
    pub merged_rows: usize,
}

/// Wires the pipeline stages against an explicitly passed warehouse handle.
pub struct SyncPipeline {
    config: Config,
    warehouse: Warehouse,
    fetcher: ActivityFetcher,
}

impl SyncPipeline {
    pub fn new(config: Config, warehouse: Warehouse) -> Self {
        let client = StravaClient::new(
            config.strava_client_id.clone(),
            config.strava_secret.clone(),
        );
        Self {
            config,
            warehouse,
            fetcher: ActivityFetcher::new(client),
        }
    }

    /// Pipeline with a custom fetcher (tests inject base URL and limits).
    pub fn with_fetcher(config: Config, warehouse: Warehouse, fetcher: ActivityFetcher) -> Self {
        Self {
            config,
            warehouse,
            fetcher,
        }
    }

    /// Run one sync for the given optional date range.
    pub async fn run(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<SyncSummary> {
        let now = Utc::now();

        // Reclaim staging tables past their retention window before
        // creating a new one.
        let dropped = self.warehouse.expire_staging_tables(now)?;
        if !dropped.is_empty() {
            tracing::info!(count = dropped.len(), "Expired old staging tables");
        }

        let window = SyncWindow::resolve(start_date, end_date, now)?;
        tracing::info!(start = %window.start, end = %window.end, "Resolved sync window");

        let tokens = self
            .fetcher_client()
            .refresh_token(&self.config.strava_refresh_token)
            .await?;

        let activities = self
            .fetcher
            .fetch_runs(&tokens.access_token, &window)
            .await?;
        tracing::info!(count = activities.len(), "Fetched run activities");

        let staging = self.warehouse.create_staging_table(now)?;
        self.warehouse.load_staging(&staging, &activities)?;

        let merged_rows = self.warehouse.merge_staging(&staging)?;
        tracing::info!(merged_rows, "Sync complete");

        Ok(SyncSummary {
            fetched_runs: activities.len(),
            merged_rows,
        })
    }

    /// The warehouse handle (read access for callers and tests).
    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    fn fetcher_client(&self) -> &StravaClient {
        self.fetcher.client()
    }
}
