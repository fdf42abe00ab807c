// SPDX-License-Identifier: MIT

//! Read-only progress report over the activities table.
//!
//! Prints the weekly distance table, per-year cumulative totals, and pace
//! projections toward the annual goal of 2,000 km ("two mega-meters").
//! Chart rendering is left to whatever consumes this output.

use chrono::Utc;
use strava_sync::config::Config;
use strava_sync::db::Warehouse;
use strava_sync::services::Reporter;

fn main() {
    strava_sync::logging::init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "Report failed");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> strava_sync::Result<()> {
    let config = Config::warehouse_from_env();
    let warehouse = Warehouse::open_read_only(&config.warehouse_path)?;
    let reporter = Reporter::new(warehouse);

    println!("Weekly Distance (current year)");
    println!("------------------------------");
    for row in reporter.weekly_distance()? {
        println!("  {}  {:>8.2} km", row.week, row.weekly_km);
    }

    println!();
    println!("Annual Cumulative Distance");
    println!("--------------------------");
    let points = reporter.cumulative_distance()?;
    let mut last_year = None;
    for point in &points {
        // One line per year: the final (largest day_of_year) point.
        if last_year != Some(point.year) {
            if let Some(latest) = points
                .iter()
                .filter(|p| p.year == point.year)
                .max_by_key(|p| p.day_of_year)
            {
                println!(
                    "  {}  day {:>3}  {:>8.2} km",
                    latest.year, latest.day_of_year, latest.cumulative_km
                );
            }
            last_year = Some(point.year);
        }
    }

    println!();
    println!("Pace and Projections");
    println!("--------------------");
    let today = Utc::now().date_naive();
    let progress = reporter.progress(today)?;
    println!("  Current year: {:.2} km", progress.current_km);
    println!("  End of year pace: {:.2} km", progress.eoy_pace_km);
    println!(
        "  Daily needed: {:.2} km ({} days left) at 7 runs per week",
        progress.daily_needed_km, progress.days_remaining
    );
    for runs_per_week in [6, 5, 4] {
        println!(
            "    {:.2} km at {} runs per week",
            progress.daily_needed_at(runs_per_week),
            runs_per_week
        );
    }
    println!(
        "  Weekly needed: {:.2} km ({:.2} weeks left)",
        progress.weekly_needed_km,
        progress.weeks_remaining()
    );
    println!(
        "  Monthly needed: {:.2} km ({:.2} months left)",
        progress.monthly_needed_km,
        progress.months_remaining()
    );

    Ok(())
}
