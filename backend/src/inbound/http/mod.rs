//! HTTP inbound adapter exposing REST endpoints.

pub mod coasters;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod scans;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
