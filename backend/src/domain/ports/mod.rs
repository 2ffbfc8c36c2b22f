//! Ports connecting the domain to the outside world.
//!
//! Driven ports (`CoasterRepository`, `ScanStore`, `DashboardRepository`)
//! are implemented by persistence adapters; driving ports
//! (`CoasterProvisioning`, `ScanCommand`, `ScanQuery`, `DashboardQuery`,
//! `LoginService`) are implemented by domain services and consumed by HTTP
//! handlers. Every port ships a `Fixture*` implementation for tests.

pub(crate) mod macros;

pub mod coaster_provisioning;
pub mod coaster_repository;
pub mod dashboard_query;
pub mod dashboard_repository;
pub mod login_service;
pub mod scan_command;
pub mod scan_query;
pub mod scan_store;

pub use coaster_provisioning::{
    BatchCreateCoastersRequest, CoasterProvisioning, CreateCoasterRequest,
    FixtureCoasterProvisioning, ProvisionedCoaster, MAX_BATCH_SIZE,
};
pub use coaster_repository::{
    ArtworkSummary, CoasterRecord, CoasterRepository, CoasterRepositoryError,
    FixtureCoasterRepository, NewCoaster,
};
pub use dashboard_query::{DashboardQuery, FixtureDashboardQuery};
pub use dashboard_repository::{
    ArtworkRanking, DashboardRepository, DashboardRepositoryError, DashboardSnapshot,
    DashboardTotals, FixtureDashboardRepository, RecentScanEntry, UserGrowthDay,
};
pub use login_service::{FixtureLoginService, LoginService};
pub use scan_command::{FixtureScanCommand, GuestCommentRequest, RecordScanRequest, ScanCommand, ScanReceipt};
pub use scan_query::{CoasterPreview, FixtureScanQuery, ScanQuery};
pub use scan_store::{
    FixtureScanStore, GuestCommentDraft, MemberScanDraft, RecordedScan, ScanHistoryEntry,
    ScanStore, ScanStoreError,
};

#[cfg(test)]
pub use coaster_provisioning::MockCoasterProvisioning;
#[cfg(test)]
pub use coaster_repository::MockCoasterRepository;
#[cfg(test)]
pub use dashboard_query::MockDashboardQuery;
#[cfg(test)]
pub use dashboard_repository::MockDashboardRepository;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use scan_command::MockScanCommand;
#[cfg(test)]
pub use scan_query::MockScanQuery;
#[cfg(test)]
pub use scan_store::MockScanStore;
