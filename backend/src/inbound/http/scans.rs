//! Scan HTTP handlers.
//!
//! ```text
//! POST /api/v1/scans {"code":"A2B3","comment":"first!","location":{"latitude":47.0,"longitude":28.8}}
//! GET  /api/v1/scans
//! POST /api/v1/coasters/{code}/guest-comment {"comment":"first!"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{GuestCommentRequest, RecordScanRequest, ScanHistoryEntry, ScanReceipt};
use crate::domain::{
    Artwork, ArtworkStatus, CoasterCode, CommentText, Error, GeoPoint, Scan,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for recording a member scan.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequestBody {
    #[schema(example = "A2B3")]
    pub code: String,
    pub comment: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Request payload for a guest comment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestCommentRequestBody {
    pub comment: String,
}

/// A scan row as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub coaster_id: String,
    pub is_first_scan: bool,
    pub points_earned: i32,
    pub location: Option<GeoPoint>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Scan> for ScanBody {
    fn from(value: Scan) -> Self {
        Self {
            id: value.id.to_string(),
            coaster_id: value.coaster_id.to_string(),
            is_first_scan: value.is_first_scan,
            points_earned: value.points_earned,
            location: value.location,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// An artwork as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: ArtworkStatus,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Artwork> for ArtworkBody {
    fn from(value: Artwork) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            description: value.description,
            image_url: value.image_url,
            status: value.status,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Response payload returned after recording a scan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponseBody {
    pub scan: ScanBody,
    pub is_first_scan: bool,
    pub points_earned: i32,
    pub artwork: ArtworkBody,
}

impl From<ScanReceipt> for ScanResponseBody {
    fn from(value: ScanReceipt) -> Self {
        Self {
            scan: ScanBody::from(value.scan),
            is_first_scan: value.is_first_scan,
            points_earned: value.points_earned,
            artwork: ArtworkBody::from(value.artwork),
        }
    }
}

/// One entry of the member's scan history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanHistoryEntryBody {
    pub scan: ScanBody,
    #[schema(example = "A2B3")]
    pub code: String,
    pub artwork_title: Option<String>,
}

impl From<ScanHistoryEntry> for ScanHistoryEntryBody {
    fn from(value: ScanHistoryEntry) -> Self {
        Self {
            scan: ScanBody::from(value.scan),
            code: value.code.to_string(),
            artwork_title: value.artwork_title,
        }
    }
}

pub(crate) fn parse_code(raw: &str) -> Result<CoasterCode, Error> {
    CoasterCode::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "code", "value": raw, "code": "invalid_code" }))
    })
}

fn parse_comment(raw: &str) -> Result<CommentText, Error> {
    CommentText::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "comment", "code": "invalid_comment" }))
    })
}

/// Record a scan for the authenticated member.
#[utoipa::path(
    post,
    path = "/api/v1/scans",
    request_body = ScanRequestBody,
    responses(
        (status = 200, description = "Scan recorded", body = ScanResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Daily scan limit reached", body = Error),
        (status = 404, description = "Unknown coaster code", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["scans"],
    operation_id = "recordScan",
    security(("SessionCookie" = []))
)]
#[post("/scans")]
pub async fn record_scan(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ScanRequestBody>,
) -> ApiResult<web::Json<ScanResponseBody>> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let code = parse_code(&payload.code)?;
    let comment = payload.comment.as_deref().map(parse_comment).transpose()?;

    let receipt = state
        .scans
        .record_scan(RecordScanRequest {
            user_id,
            code,
            comment,
            location: payload.location,
        })
        .await?;

    Ok(web::Json(ScanResponseBody::from(receipt)))
}

/// List the authenticated member's scans, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/scans",
    responses(
        (status = 200, description = "Scan history", body = [ScanHistoryEntryBody]),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["scans"],
    operation_id = "listScans",
    security(("SessionCookie" = []))
)]
#[get("/scans")]
pub async fn list_scans(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ScanHistoryEntryBody>>> {
    let user_id = session.require_user_id()?;
    let entries = state.scan_query.list_user_scans(user_id).await?;
    Ok(web::Json(
        entries.into_iter().map(ScanHistoryEntryBody::from).collect(),
    ))
}

/// Leave a guest comment on an undiscovered coaster.
#[utoipa::path(
    post,
    path = "/api/v1/coasters/{code}/guest-comment",
    params(("code" = String, Path, description = "Coaster code")),
    request_body = GuestCommentRequestBody,
    responses(
        (status = 200, description = "Comment recorded", body = ScanResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Coaster already discovered", body = Error),
        (status = 404, description = "Unknown coaster code", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["scans"],
    operation_id = "recordGuestComment",
    security([])
)]
#[post("/coasters/{code}/guest-comment")]
pub async fn record_guest_comment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<GuestCommentRequestBody>,
) -> ApiResult<web::Json<ScanResponseBody>> {
    let code = parse_code(&path.into_inner())?;
    let comment = parse_comment(&payload.into_inner().comment)?;

    let receipt = state
        .scans
        .record_guest_comment(GuestCommentRequest { code, comment })
        .await?;

    Ok(web::Json(ScanResponseBody::from(receipt)))
}

#[cfg(test)]
#[path = "scans_tests.rs"]
mod tests;
