// SPDX-License-Identifier: MIT

//! Warehouse layer (DuckDB).

pub mod warehouse;

pub use warehouse::{StagingTable, Warehouse};

/// Table names as constants.
pub mod tables {
    /// Permanent activities table, the data contract between binaries.
    pub const ACTIVITIES: &str = "activities";
    /// Prefix of per-run staging tables; a UTC timestamp is appended.
    pub const STAGING_PREFIX: &str = "strava_activities_tmp_";
}
