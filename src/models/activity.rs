// SPDX-License-Identifier: MIT

//! Activity record and warehouse schema declaration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One column of the activities schema.
///
/// The schema is declared once, in a fixed order, and every generated
/// statement (DDL, insert, merge) is derived from it so the SQL text is
/// deterministic and reviewable.
#[derive(Debug, Clone, Copy)]
pub struct ActivityColumn {
    pub name: &'static str,
    pub sql_type: &'static str,
}

/// Fixed schema of both the permanent and staging activities tables, in
/// declaration order. `id` is the merge key.
pub const ACTIVITY_COLUMNS: &[ActivityColumn] = &[
    ActivityColumn { name: "id", sql_type: "BIGINT" },
    ActivityColumn { name: "start_date", sql_type: "TIMESTAMP" },
    ActivityColumn { name: "distance", sql_type: "DOUBLE" },
    ActivityColumn { name: "elapsed_time", sql_type: "DOUBLE" },
    ActivityColumn { name: "moving_time", sql_type: "DOUBLE" },
    ActivityColumn { name: "total_elevation_gain", sql_type: "DOUBLE" },
];

/// Projected activity record, the unit of data moved through the pipeline.
///
/// Distances and elevation are meters, times are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID; globally unique, the idempotency key for merge.
    pub id: i64,
    pub start_date: DateTime<Utc>,
    pub distance: f64,
    pub elapsed_time: f64,
    pub moving_time: f64,
    pub total_elevation_gain: f64,
}

/// Summary activity as returned by the Strava listing endpoint.
///
/// Only the fields we keep are deserialized; serde drops the rest of the
/// object. `activity_type` exists solely to filter to runs at fetch time
/// and is not persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: i64,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub start_date: DateTime<Utc>,
    pub distance: f64,
    pub elapsed_time: f64,
    pub moving_time: f64,
    pub total_elevation_gain: f64,
}

impl StravaActivitySummary {
    /// Whether this activity survives the ingestion filter.
    pub fn is_run(&self) -> bool {
        self.activity_type == "Run"
    }
}

impl From<StravaActivitySummary> for Activity {
    fn from(raw: StravaActivitySummary) -> Self {
        Self {
            id: raw.id,
            start_date: raw.start_date,
            distance: raw.distance,
            elapsed_time: raw.elapsed_time,
            moving_time: raw.moving_time,
            total_elevation_gain: raw.total_elevation_gain,
        }
    }
}
