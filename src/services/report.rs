// SPDX-License-Identifier: MIT

//! Dashboard reporter: read-only analytical queries plus goal projections.
//!
//! Each query's result is cached for a fixed TTL keyed by its SQL text, so
//! repeated dashboard refreshes do not re-hit the warehouse. The reporter
//! never writes.

use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};

use crate::db::warehouse::{queries, CumulativePoint, WeeklyDistance};
use crate::db::Warehouse;
use crate::error::Result;
use crate::models::stats::{GoalProgress, ANNUAL_GOAL_KM};

/// How long a query result stays fresh.
pub const CACHE_TTL_SECS: u64 = 600;

/// TTL cache of query results, keyed by query text.
///
/// Values are stored as JSON so one cache serves differently typed rows.
pub struct QueryCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

struct CacheEntry {
    fetched_at: Instant,
    rows: serde_json::Value,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Return the cached value for `query` if still fresh.
    pub fn get(&self, query: &str) -> Option<serde_json::Value> {
        let entry = self.entries.get(query)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.rows.clone())
        } else {
            None
        }
    }

    pub fn put(&self, query: &str, rows: serde_json::Value) {
        self.entries.insert(
            query.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                rows,
            },
        );
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(CACHE_TTL_SECS))
    }
}

/// Read path over the permanent activities table.
pub struct Reporter {
    warehouse: Warehouse,
    cache: QueryCache,
    goal_km: f64,
}

impl Reporter {
    pub fn new(warehouse: Warehouse) -> Self {
        Self {
            warehouse,
            cache: QueryCache::default(),
            goal_km: ANNUAL_GOAL_KM,
        }
    }

    /// Reporter with a custom cache and goal (tests).
    pub fn with_cache(warehouse: Warehouse, cache: QueryCache, goal_km: f64) -> Self {
        Self {
            warehouse,
            cache,
            goal_km,
        }
    }

    /// Weekly distance (km) for the current year.
    pub fn weekly_distance(&self) -> Result<Vec<WeeklyDistance>> {
        self.cached(queries::WEEKLY_DISTANCE, || {
            self.warehouse.query_weekly_distance()
        })
    }

    /// Year-over-year cumulative distance by day of year.
    pub fn cumulative_distance(&self) -> Result<Vec<CumulativePoint>> {
        self.cached(queries::CUMULATIVE_DISTANCE, || {
            self.warehouse.query_cumulative_distance()
        })
    }

    /// Current-year total distance in km.
    pub fn current_year_total(&self) -> Result<f64> {
        self.cached(queries::CURRENT_YEAR_TOTAL, || {
            self.warehouse.query_current_year_total()
        })
    }

    /// Pace and projection stats for `today`.
    pub fn progress(&self, today: NaiveDate) -> Result<GoalProgress> {
        let current_km = self.current_year_total()?;
        Ok(GoalProgress::project(
            current_km,
            today.ordinal(),
            self.goal_km,
        ))
    }

    fn cached<T, F>(&self, query: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(rows) = self.cache.get(query) {
            if let Ok(value) = serde_json::from_value(rows) {
                return Ok(value);
            }
            // Cache held something unexpected; fall through to re-query.
        }

        let value = fetch()?;
        match serde_json::to_value(&value) {
            Ok(rows) => self.cache.put(query, rows),
            Err(err) => tracing::warn!(error = %err, "Failed to cache query result"),
        }
        Ok(value)
    }
}
