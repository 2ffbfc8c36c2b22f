//! Driven port for admin dashboard aggregates.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::macros::define_port_error;
use crate::domain::venue::Venue;

define_port_error! {
    /// Failures surfaced by [`DashboardRepository`] implementations.
    DashboardRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "storage connection failed: {message}",
        /// A statement failed after the connection was established.
        Query { message: String } => "storage query failed: {message}",
    }
}

/// Whole-table counts shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub users: i64,
    pub venues: i64,
    pub artworks: i64,
    pub coasters: i64,
    pub scans: i64,
}

/// One row of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentScanEntry {
    pub scan_id: Uuid,
    pub code: String,
    pub artwork_title: Option<String>,
    pub venue_name: Option<String>,
    pub user_name: Option<String>,
    pub is_first_scan: bool,
    pub created_at: DateTime<Utc>,
}

/// An artwork ranked by the number of scans recorded against its coasters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkRanking {
    pub artwork_id: Uuid,
    pub title: Option<String>,
    pub scan_count: i64,
}

/// New member registrations on one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserGrowthDay {
    pub date: NaiveDate,
    pub new_users: i64,
}

/// Everything the admin dashboard renders, loaded in one consistent read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub totals: DashboardTotals,
    pub recent_scans: Vec<RecentScanEntry>,
    /// Active venues ranked by their denormalized scan counter.
    pub top_venues: Vec<Venue>,
    pub top_artworks: Vec<ArtworkRanking>,
    pub user_growth: Vec<UserGrowthDay>,
}

/// Read-only aggregate queries backing the admin dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Load the full dashboard snapshot.
    async fn load_snapshot(&self) -> Result<DashboardSnapshot, DashboardRepositoryError>;
}

/// Fixture returning a canned snapshot.
#[derive(Debug, Clone, Default)]
pub struct FixtureDashboardRepository {
    pub snapshot: DashboardSnapshot,
}

#[async_trait]
impl DashboardRepository for FixtureDashboardRepository {
    async fn load_snapshot(&self) -> Result<DashboardSnapshot, DashboardRepositoryError> {
        Ok(self.snapshot.clone())
    }
}
