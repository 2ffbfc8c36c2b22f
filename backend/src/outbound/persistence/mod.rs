//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.

pub mod diesel_coaster_repository;
pub mod diesel_dashboard_repository;
pub mod diesel_login_service;
pub mod diesel_scan_store;
pub mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_coaster_repository::DieselCoasterRepository;
pub use diesel_dashboard_repository::DieselDashboardRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_scan_store::DieselScanStore;
pub use pool::{DbPool, PoolConfig, PoolError};
