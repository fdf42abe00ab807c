// SPDX-License-Identifier: MIT

//! Pipeline error taxonomy.
//!
//! Every failure is fatal to the run: there is no retry anywhere, because
//! re-invoking the whole pipeline is safe (the merge is idempotent on `id`).

/// Errors raised by the sync pipeline and the reporter.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A provided `--start_date`/`--end_date` string did not parse.
    #[error("invalid date {input:?} (expected YYYY-MM-DD): {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Token refresh against the OAuth endpoint failed.
    #[error("token refresh failed: {0}")]
    Auth(String),

    /// A page of the activity listing failed; partial results are dropped.
    #[error("Strava API error: {0}")]
    Api(String),

    /// Every allowed page came back non-empty. The window is too large or
    /// the API is misbehaving; narrow the window and re-run.
    #[error("reached page cap of {max_pages} without an empty page")]
    ExhaustedPagination { max_pages: u32 },

    /// The staging insert reported row-level errors. The staging table is
    /// left behind for inspection and reclaimed by the expiry sweep.
    #[error("staging load reported {} row error(s): {}", .0.len(), .0.join("; "))]
    Load(Vec<String>),

    /// The merge statement failed to execute.
    #[error("merge failed: {0}")]
    Merge(String),

    #[error("warehouse error: {0}")]
    Warehouse(#[from] duckdb::Error),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for pipeline stages.
pub type Result<T> = std::result::Result<T, SyncError>;
