//! Driving port for the admin dashboard.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ports::dashboard_repository::DashboardSnapshot;

/// Dashboard reads invoked by admin endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Load the dashboard snapshot.
    async fn snapshot(&self) -> Result<DashboardSnapshot, Error>;
}

/// Fixture returning a canned snapshot.
#[derive(Debug, Clone, Default)]
pub struct FixtureDashboardQuery {
    pub snapshot: DashboardSnapshot,
}

#[async_trait]
impl DashboardQuery for FixtureDashboardQuery {
    async fn snapshot(&self) -> Result<DashboardSnapshot, Error> {
        Ok(self.snapshot.clone())
    }
}
