// SPDX-License-Identifier: MIT

//! Services: Strava API access, the sync pipeline, and the reporter.

pub mod report;
pub mod strava;
pub mod sync;

pub use report::{QueryCache, Reporter};
pub use strava::{ActivityFetcher, StravaClient, TokenRefreshResponse};
pub use sync::SyncPipeline;
