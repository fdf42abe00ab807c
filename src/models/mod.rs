// SPDX-License-Identifier: MIT

//! Data models for the pipeline and reporter.

pub mod activity;
pub mod stats;

pub use activity::{Activity, ActivityColumn, StravaActivitySummary, ACTIVITY_COLUMNS};
pub use stats::GoalProgress;
