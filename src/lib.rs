// SPDX-License-Identifier: MIT

//! Strava-Sync: load running activities into an analytical warehouse.
//!
//! Two binaries share this library and the `activities` table:
//! - `strava-sync` fetches activities from the Strava API for a date
//!   window, stages them, and merges them idempotently by activity id.
//! - `strava-report` runs read-only analytical queries over the table
//!   and projects pace toward the annual distance goal.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod window;

pub use error::{Result, SyncError};
