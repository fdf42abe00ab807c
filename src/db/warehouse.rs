// SPDX-License-Identifier: MIT

//! DuckDB-backed analytical warehouse.
//!
//! Handles:
//! - Permanent `activities` table DDL
//! - Per-run staging tables (timestamp-named, 3-day retention)
//! - Bulk staging insert with row-level error collection
//! - The single merge (upsert) statement, generated from the declared schema
//! - The reporter's analytical queries

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use duckdb::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::tables;
use crate::error::{Result, SyncError};
use crate::models::{Activity, ACTIVITY_COLUMNS};

/// How long staging tables are kept before the sweep reclaims them.
pub const STAGING_RETENTION_DAYS: i64 = 3;

/// Timestamp suffix of staging table names, microsecond precision so rapid
/// successive runs cannot collide. Lexicographic order equals time order,
/// which the expiry sweep relies on.
const STAGING_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%6f";

/// Handle to a created staging table.
#[derive(Debug, Clone)]
pub struct StagingTable {
    pub name: String,
    /// When the expiry sweep becomes allowed to drop this table.
    pub expires_at: DateTime<Utc>,
}

/// Connection to the analytical warehouse.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Open (or create) the warehouse file and ensure the permanent table.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let warehouse = Self { conn };
        warehouse.ensure_activities_table()?;
        Ok(warehouse)
    }

    /// Open an existing warehouse read-only (reporter path).
    pub fn open_read_only(path: &str) -> Result<Self> {
        let config = duckdb::Config::default().access_mode(duckdb::AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(path, config)?;
        Ok(Self { conn })
    }

    /// In-memory warehouse for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let warehouse = Self { conn };
        warehouse.ensure_activities_table()?;
        Ok(warehouse)
    }

    /// Create the permanent activities table if it does not exist.
    pub fn ensure_activities_table(&self) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} ({}, PRIMARY KEY (id))",
            tables::ACTIVITIES,
            column_definitions()
        );
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    // ─── Staging ─────────────────────────────────────────────────────────

    /// Create a uniquely named, empty staging table with the fixed schema.
    pub fn create_staging_table(&self, now: DateTime<Utc>) -> Result<StagingTable> {
        let name = format!(
            "{}{}",
            tables::STAGING_PREFIX,
            now.format(STAGING_TIMESTAMP_FORMAT)
        );
        let ddl = format!("CREATE TABLE \"{}\" ({})", name, column_definitions());
        self.conn.execute_batch(&ddl)?;

        tracing::debug!(table = %name, "Created staging table");
        Ok(StagingTable {
            name,
            expires_at: now + Duration::days(STAGING_RETENTION_DAYS),
        })
    }

    /// Bulk-insert activities into the staging table as one batch.
    ///
    /// Row-level failures are collected and reported together as a
    /// `Load` error; the staging table is deliberately left behind for
    /// inspection (the expiry sweep reclaims it). An empty input is a
    /// successful zero-row insert.
    pub fn load_staging(&self, staging: &StagingTable, activities: &[Activity]) -> Result<usize> {
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            staging.name,
            column_list(),
            value_placeholders()
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut errors = Vec::new();
        for activity in activities {
            let start_date = activity.start_date.naive_utc().to_string();
            if let Err(err) = stmt.execute(params![
                activity.id,
                start_date,
                activity.distance,
                activity.elapsed_time,
                activity.moving_time,
                activity.total_elevation_gain,
            ]) {
                errors.push(format!("id {}: {}", activity.id, err));
            }
        }

        if !errors.is_empty() {
            return Err(SyncError::Load(errors));
        }

        tracing::info!(
            table = %staging.name,
            rows = activities.len(),
            "Loaded records into staging"
        );
        Ok(activities.len())
    }

    /// Drop staging tables older than the retention window.
    ///
    /// DuckDB has no native table TTL, so expiry is a sweep run at the
    /// start of every sync. The cutoff is a name comparison: timestamps in
    /// the fixed format sort lexicographically.
    pub fn expire_staging_tables(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let cutoff = format!(
            "{}{}",
            tables::STAGING_PREFIX,
            (now - Duration::days(STAGING_RETENTION_DAYS)).format(STAGING_TIMESTAMP_FORMAT)
        );

        let mut dropped = Vec::new();
        for name in self.list_staging_tables()? {
            if name < cutoff {
                self.conn.execute_batch(&format!("DROP TABLE \"{}\"", name))?;
                tracing::info!(table = %name, "Dropped expired staging table");
                dropped.push(name);
            }
        }
        Ok(dropped)
    }

    /// List all staging tables currently in the warehouse.
    pub fn list_staging_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_name LIKE ? ORDER BY table_name",
        )?;
        let pattern = format!("{}%", tables::STAGING_PREFIX);
        let names = stmt
            .query_map(params![pattern], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    // ─── Merge ───────────────────────────────────────────────────────────

    /// Merge the staging table into the permanent table, keyed by `id`.
    ///
    /// One upsert statement: matching rows have all non-key fields
    /// overwritten from staging, non-matching rows are inserted whole.
    /// Returns the affected row count for logging.
    pub fn merge_staging(&self, staging: &StagingTable) -> Result<usize> {
        let sql = build_merge_sql(&staging.name);
        let affected = self
            .conn
            .execute(&sql, [])
            .map_err(|err| SyncError::Merge(err.to_string()))?;

        tracing::info!(
            table = %staging.name,
            affected,
            "Merged staging into permanent table"
        );
        Ok(affected)
    }

    // ─── Reporter queries ────────────────────────────────────────────────

    /// Weekly distance (km) for the current year, weeks starting Monday.
    pub fn query_weekly_distance(&self) -> Result<Vec<WeeklyDistance>> {
        let mut stmt = self.conn.prepare(queries::WEEKLY_DISTANCE)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(WeeklyDistance {
                    week: row.get(0)?,
                    weekly_km: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Year-over-year cumulative distance (km) by day of year.
    pub fn query_cumulative_distance(&self) -> Result<Vec<CumulativePoint>> {
        let mut stmt = self.conn.prepare(queries::CUMULATIVE_DISTANCE)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CumulativePoint {
                    year: row.get(0)?,
                    day_of_year: row.get(1)?,
                    cumulative_km: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Total distance (km) for the current year; 0 when the table is empty.
    pub fn query_current_year_total(&self) -> Result<f64> {
        let total = self
            .conn
            .query_row(queries::CURRENT_YEAR_TOTAL, [], |row| row.get::<_, f64>(0))?;
        Ok(total)
    }

    /// All rows of the permanent table ordered by id (test support).
    pub fn fetch_all_activities(&self) -> Result<Vec<Activity>> {
        let sql = format!(
            "SELECT id, CAST(start_date AS VARCHAR), distance, elapsed_time, \
             moving_time, total_elevation_gain FROM {} ORDER BY id",
            tables::ACTIVITIES
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, start, distance, elapsed, moving, elevation)| {
                let start_date = NaiveDateTime::parse_from_str(&start, "%Y-%m-%d %H:%M:%S%.f")
                    .map_err(|err| {
                        SyncError::Internal(anyhow::anyhow!("bad timestamp {start:?}: {err}"))
                    })?;
                Ok(Activity {
                    id,
                    start_date: start_date.and_utc(),
                    distance,
                    elapsed_time: elapsed,
                    moving_time: moving,
                    total_elevation_gain: elevation,
                })
            })
            .collect()
    }
}

/// The reporter's analytical SQL. Each statement is also the cache key for
/// its result, so the text lives in one place.
pub mod queries {
    /// Weekly distance for the current year, Monday-truncated.
    pub const WEEKLY_DISTANCE: &str = "\
select
  strftime(cast(date_trunc('week', start_date) as date), '%Y-%m-%d') as week,
  sum(distance) / 1000.0 as weekly_distance
from activities
where cast(start_date as date) >= date_trunc('year', current_date)
group by 1
order by 1 asc";

    /// Cumulative distance by day of year, per year, since the history floor.
    pub const CUMULATIVE_DISTANCE: &str = "\
with day_counts as (
  select
    cast(extract(year from start_date) as integer) as year,
    cast(dayofyear(start_date) as integer) as day_of_year,
    sum(distance) / 1000.0 as total_distance
  from activities
  where start_date >= timestamp '2020-01-01'
  group by 1, 2
)
select
  year,
  day_of_year,
  sum(total_distance) over (
    partition by year order by day_of_year asc
    rows between unbounded preceding and current row
  ) as cumulative_distance
from day_counts
order by year, day_of_year";

    /// Total current-year distance in km.
    pub const CURRENT_YEAR_TOTAL: &str = "\
select coalesce(sum(distance), 0) / 1000.0 as current_year_distance
from activities
where cast(start_date as date) >= date_trunc('year', current_date)";
}

/// One bar of the weekly distance chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDistance {
    /// Monday of the week, `YYYY-MM-DD`.
    pub week: String,
    pub weekly_km: f64,
}

/// One point on the year-over-year cumulative distance chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub year: i32,
    pub day_of_year: i32,
    pub cumulative_km: f64,
}

// ─── Generated SQL fragments ─────────────────────────────────────────────
//
// All statement text derives from ACTIVITY_COLUMNS in declaration order,
// so the generated SQL is deterministic and reviewable.

fn column_definitions() -> String {
    ACTIVITY_COLUMNS
        .iter()
        .map(|c| format!("{} {}", c.name, c.sql_type))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_list() -> String {
    ACTIVITY_COLUMNS
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn value_placeholders() -> String {
    ACTIVITY_COLUMNS
        .iter()
        .map(|c| match c.sql_type {
            "TIMESTAMP" => "CAST(? AS TIMESTAMP)",
            _ => "?",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn update_set_clause() -> String {
    ACTIVITY_COLUMNS
        .iter()
        .filter(|c| c.name != "id") // merge key is never updated
        .map(|c| format!("{name} = excluded.{name}", name = c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the single upsert statement from staging into the permanent table.
pub fn build_merge_sql(staging_name: &str) -> String {
    format!(
        "INSERT INTO {table} ({columns}) \
         SELECT {columns} FROM \"{staging}\" \
         ON CONFLICT (id) DO UPDATE SET {updates}",
        table = tables::ACTIVITIES,
        columns = column_list(),
        staging = staging_name,
        updates = update_set_clause(),
    )
}
