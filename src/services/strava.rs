// SPDX-License-Identifier: MIT

//! Strava API client for token refresh and activity listing.
//!
//! Handles:
//! - Exchanging the long-lived refresh token for a bearer token
//! - Paginated activity fetching within a time window
//! - Run filtering and field projection

use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::models::{Activity, StravaActivitySummary};
use crate::window::SyncWindow;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_url(client_id, client_secret, "https://www.strava.com".to_string())
    }

    /// Create a client against a different base URL (tests).
    pub fn with_base_url(client_id: String, client_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            client_id,
            client_secret,
        }
    }

    /// Exchange the refresh token for a short-lived access token.
    ///
    /// Any non-success status is an `Auth` error; the caller must re-invoke
    /// the whole pipeline, there is no retry.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let url = format!("{}/oauth/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Auth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Auth(format!("Token response parse error: {}", e)))
    }

    /// Fetch one page of the athlete's activities within epoch bounds.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>> {
        let url = format!("{}/api/v3/athlete/activities", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Api(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Api(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

// ─────────────────────────────────────────────────────────────────────────
// ActivityFetcher - paginated fetch loop with termination policy
// ─────────────────────────────────────────────────────────────────────────

/// Default page size of the listing endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default pagination cap. Hitting it without a natural empty page means
/// the window was too large or the API is misbehaving.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Pages through the listing endpoint, filters to runs, projects fields.
///
/// Page size and page cap are construction-time options so tests can
/// exercise boundary and exhaustion behavior with small fixtures.
pub struct ActivityFetcher {
    client: StravaClient,
    page_size: u32,
    max_pages: u32,
}

impl ActivityFetcher {
    pub fn new(client: StravaClient) -> Self {
        Self::with_limits(client, DEFAULT_PAGE_SIZE, DEFAULT_MAX_PAGES)
    }

    pub fn with_limits(client: StravaClient, page_size: u32, max_pages: u32) -> Self {
        Self {
            client,
            page_size,
            max_pages,
        }
    }

    /// The underlying API client (also used for token refresh).
    pub fn client(&self) -> &StravaClient {
        &self.client
    }

    /// Fetch all run activities within the window.
    ///
    /// Iterates pages until one comes back empty (normal termination).
    /// Results keep the API's return order. An error on any page abandons
    /// the partial fetch, and exhausting the page cap is an error of its
    /// own: a correctness guard, not a retry trigger.
    pub async fn fetch_runs(&self, access_token: &str, window: &SyncWindow) -> Result<Vec<Activity>> {
        tracing::info!(start = %window.start, end = %window.end, "Fetching activities");

        let mut activities = Vec::new();
        for page in 1..=self.max_pages {
            let summaries = self
                .client
                .list_activities(
                    access_token,
                    window.after_epoch(),
                    window.before_epoch(),
                    page,
                    self.page_size,
                )
                .await?;

            let fetched = summaries.len();
            activities.extend(
                summaries
                    .into_iter()
                    .filter(StravaActivitySummary::is_run)
                    .map(Activity::from),
            );

            if fetched == 0 {
                tracing::info!(pages = page, runs = activities.len(), "Fetch complete");
                return Ok(activities);
            }
            tracing::debug!(page, fetched, "Fetched page");
        }

        Err(SyncError::ExhaustedPagination {
            max_pages: self.max_pages,
        })
    }
}
