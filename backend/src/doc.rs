//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every inbound HTTP path, the request and response body
//! schemas, and the session cookie security scheme. The generated document
//! backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    ArtworkRanking, DashboardSnapshot, DashboardTotals, RecentScanEntry, UserGrowthDay,
};
use crate::domain::{ArtworkStatus, CoasterStatus, Error, ErrorCode, GeoPoint, Venue, VenueStatus};
use crate::inbound::http::coasters::{
    ArtworkSummaryBody, BatchCreateCoastersRequestBody, CoasterBody, CoasterPreviewBody,
    CreateCoasterRequestBody,
};
use crate::inbound::http::scans::{
    ArtworkBody, GuestCommentRequestBody, ScanBody, ScanHistoryEntryBody, ScanRequestBody,
    ScanResponseBody,
};
use crate::inbound::http::users::LoginRequestBody;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Coaster discovery backend API",
        description = "HTTP interface for coaster scanning, provisioning, and the admin dashboard."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::scans::record_scan,
        crate::inbound::http::scans::list_scans,
        crate::inbound::http::scans::record_guest_comment,
        crate::inbound::http::coasters::create_coaster,
        crate::inbound::http::coasters::batch_create_coasters,
        crate::inbound::http::coasters::preview_coaster,
        crate::inbound::http::coasters::latest_artworks,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        GeoPoint,
        ArtworkStatus,
        CoasterStatus,
        LoginRequestBody,
        ScanRequestBody,
        GuestCommentRequestBody,
        ScanBody,
        ArtworkBody,
        ScanResponseBody,
        ScanHistoryEntryBody,
        CreateCoasterRequestBody,
        BatchCreateCoastersRequestBody,
        CoasterBody,
        CoasterPreviewBody,
        ArtworkSummaryBody,
        DashboardSnapshot,
        DashboardTotals,
        RecentScanEntry,
        Venue,
        VenueStatus,
        ArtworkRanking,
        UserGrowthDay,
    )),
    tags(
        (name = "users", description = "Login and session management"),
        (name = "scans", description = "Member scans and guest comments"),
        (name = "coasters", description = "Coaster provisioning and previews"),
        (name = "artworks", description = "Public artwork listings"),
        (name = "admin", description = "Admin aggregates"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
