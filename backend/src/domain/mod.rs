//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities for the scanning core and keep
//! them transport and storage agnostic. Invariants and serialisation
//! contracts (serde) are documented in each type's Rustdoc; adapters live in
//! `inbound` and `outbound`.

pub mod artwork;
pub mod coaster;
pub mod code;
pub mod dashboard_service;
pub mod error;
pub mod ports;
pub mod provisioning_service;
pub mod scan;
pub mod scan_service;
pub mod trace_id;
pub mod user;
pub mod venue;

pub use self::artwork::{Artwork, ArtworkStatus};
pub use self::coaster::{Coaster, CoasterStatus};
pub use self::code::{CODE_ALPHABET, CODE_LENGTH, CoasterCode, CodeValidationError};
pub use self::dashboard_service::DashboardService;
pub use self::error::{Error, ErrorCode};
pub use self::provisioning_service::ProvisioningService;
pub use self::scan::{
    COMMENT_MAX_LEN, CommentText, DAILY_SCAN_LIMIT, FIRST_SCAN_POINTS, GeoPoint,
    REPEAT_SCAN_POINTS, Scan, ScanValidationError,
};
pub use self::scan_service::ScanService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AuthenticatedUser, LoginCredentials, LoginValidationError, UserId, UserValidationError,
};
pub use self::venue::{Venue, VenueStatus};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use coaster_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
