// SPDX-License-Identifier: MIT

//! Goal-pace projections for the dashboard reporter.
//!
//! Pure arithmetic over the current-year total and the day of year. These
//! values are presentation-only; nothing here feeds back into the pipeline.

/// Annual distance goal in kilometers ("two mega-meters").
pub const ANNUAL_GOAL_KM: f64 = 2000.0;

/// Average month length in days (365 / 12), used for the monthly
/// projection instead of calendar-month bookkeeping.
pub const AVG_DAYS_PER_MONTH: f64 = 30.5;

const DAYS_PER_YEAR: f64 = 365.0;

/// Derived pace statistics toward the annual goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal_km: f64,
    pub current_km: f64,
    pub day_of_year: u32,
    /// Projected end-of-year total at the current pace.
    pub eoy_pace_km: f64,
    pub days_remaining: u32,
    /// Kilometers needed per day (running every day) to reach the goal.
    pub daily_needed_km: f64,
    pub weekly_needed_km: f64,
    pub monthly_needed_km: f64,
}

impl GoalProgress {
    /// Project pace stats from the current-year total and day of year.
    pub fn project(current_km: f64, day_of_year: u32, goal_km: f64) -> Self {
        let days_remaining = DAYS_PER_YEAR as u32 - day_of_year.min(DAYS_PER_YEAR as u32);
        let daily_needed_km = (goal_km - current_km) / days_remaining as f64;

        Self {
            goal_km,
            current_km,
            day_of_year,
            eoy_pace_km: current_km * DAYS_PER_YEAR / day_of_year as f64,
            days_remaining,
            daily_needed_km,
            weekly_needed_km: daily_needed_km * 7.0,
            monthly_needed_km: daily_needed_km * AVG_DAYS_PER_MONTH,
        }
    }

    /// Daily distance needed when running only `runs_per_week` days a week.
    pub fn daily_needed_at(&self, runs_per_week: u32) -> f64 {
        (self.goal_km - self.current_km)
            / (self.days_remaining as f64 * runs_per_week as f64 / 7.0)
    }

    pub fn weeks_remaining(&self) -> f64 {
        self.days_remaining as f64 / 7.0
    }

    pub fn months_remaining(&self) -> f64 {
        self.days_remaining as f64 / AVG_DAYS_PER_MONTH
    }
}
