//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CoasterProvisioning, DashboardQuery, FixtureCoasterProvisioning, FixtureDashboardQuery,
    FixtureLoginService, FixtureScanCommand, FixtureScanQuery, LoginService, ScanCommand,
    ScanQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub provisioning: Arc<dyn CoasterProvisioning>,
    pub scans: Arc<dyn ScanCommand>,
    pub scan_query: Arc<dyn ScanQuery>,
    pub dashboard: Arc<dyn DashboardQuery>,
}

impl Default for HttpState {
    /// State backed entirely by fixture ports, for tests and examples.
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService::default()),
            provisioning: Arc::new(FixtureCoasterProvisioning::default()),
            scans: Arc::new(FixtureScanCommand::default()),
            scan_query: Arc::new(FixtureScanQuery::default()),
            dashboard: Arc::new(FixtureDashboardQuery::default()),
        }
    }
}
