//! Admin dashboard reads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ports::{
    DashboardQuery, DashboardRepository, DashboardRepositoryError, DashboardSnapshot,
};

/// Serves dashboard snapshots from a [`DashboardRepository`].
pub struct DashboardService<D> {
    dashboard_repo: Arc<D>,
}

impl<D> DashboardService<D>
where
    D: DashboardRepository,
{
    pub fn new(dashboard_repo: Arc<D>) -> Self {
        Self { dashboard_repo }
    }
}

#[async_trait]
impl<D> DashboardQuery for DashboardService<D>
where
    D: DashboardRepository,
{
    async fn snapshot(&self) -> Result<DashboardSnapshot, Error> {
        self.dashboard_repo
            .load_snapshot()
            .await
            .map_err(|err| match err {
                DashboardRepositoryError::Connection { message } => {
                    tracing::error!(error = %message, "dashboard storage unreachable");
                    Error::service_unavailable("storage is temporarily unavailable")
                }
                DashboardRepositoryError::Query { message } => {
                    tracing::error!(error = %message, "dashboard aggregate query failed");
                    Error::internal("storage query failed")
                }
            })
    }
}
