//! Coaster provisioning and preview handlers.
//!
//! ```text
//! POST /api/v1/coasters {"artworkId":"...","venueId":"..."}
//! POST /api/v1/coasters/batch {"artworkId":"...","count":25,"venueId":"..."}
//! GET  /api/v1/coasters/{code}
//! GET  /api/v1/artworks/latest
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    ArtworkSummary, BatchCreateCoastersRequest, CoasterPreview, CreateCoasterRequest,
    ProvisionedCoaster, MAX_BATCH_SIZE,
};
use crate::domain::{CoasterStatus, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::scans::{parse_code, ArtworkBody};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload for provisioning one coaster.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoasterRequestBody {
    #[schema(format = "uuid")]
    pub artwork_id: String,
    #[schema(format = "uuid")]
    pub venue_id: Option<String>,
}

/// Request payload for provisioning a batch of coasters for one artwork.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateCoastersRequestBody {
    #[schema(format = "uuid")]
    pub artwork_id: String,
    #[schema(minimum = 1, maximum = 100)]
    pub count: usize,
    #[schema(format = "uuid")]
    pub venue_id: Option<String>,
}

/// A provisioned coaster as returned to admins.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoasterBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(example = "A2B3")]
    pub code: String,
    #[schema(format = "uuid")]
    pub artwork_id: String,
    #[schema(format = "uuid")]
    pub venue_id: Option<String>,
    pub status: CoasterStatus,
    #[schema(format = "uri", example = "https://zd.md/A2B3")]
    pub share_url: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<ProvisionedCoaster> for CoasterBody {
    fn from(value: ProvisionedCoaster) -> Self {
        Self {
            id: value.coaster.id.to_string(),
            code: value.coaster.code.to_string(),
            artwork_id: value.coaster.artwork_id.to_string(),
            venue_id: value.coaster.venue_id.map(|id| id.to_string()),
            status: value.coaster.status,
            share_url: value.share_url.to_string(),
            created_at: value.coaster.created_at.to_rfc3339(),
        }
    }
}

/// Anonymous preview of a coaster and its artwork.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoasterPreviewBody {
    #[schema(example = "A2B3")]
    pub code: String,
    pub artwork: ArtworkBody,
    pub is_first_scan: bool,
}

impl From<CoasterPreview> for CoasterPreviewBody {
    fn from(value: CoasterPreview) -> Self {
        Self {
            code: value.coaster.code.to_string(),
            artwork: ArtworkBody::from(value.artwork),
            is_first_scan: value.is_first_scan,
        }
    }
}

/// One artwork of the public latest-artworks strip.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSummaryBody {
    pub artwork: ArtworkBody,
    pub artist_name: Option<String>,
}

impl From<ArtworkSummary> for ArtworkSummaryBody {
    fn from(value: ArtworkSummary) -> Self {
        Self {
            artwork: ArtworkBody::from(value.artwork),
            artist_name: value.artist_name,
        }
    }
}

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID"))
            .with_details(json!({ "field": field, "value": raw, "code": "invalid_uuid" }))
    })
}

fn parse_create_request(body: CreateCoasterRequestBody) -> Result<CreateCoasterRequest, Error> {
    Ok(CreateCoasterRequest {
        artwork_id: parse_uuid(&body.artwork_id, "artworkId")?,
        venue_id: body
            .venue_id
            .as_deref()
            .map(|raw| parse_uuid(raw, "venueId"))
            .transpose()?,
    })
}

/// Provision a single coaster.
#[utoipa::path(
    post,
    path = "/api/v1/coasters",
    request_body = CreateCoasterRequestBody,
    responses(
        (status = 200, description = "Coaster provisioned", body = CoasterBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "Unknown artwork or venue", body = Error),
        (status = 409, description = "Code allocation conflict", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["coasters"],
    operation_id = "createCoaster",
    security(("SessionCookie" = []))
)]
#[post("/coasters")]
pub async fn create_coaster(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCoasterRequestBody>,
) -> ApiResult<web::Json<CoasterBody>> {
    session.require_admin()?;
    let request = parse_create_request(payload.into_inner())?;
    let provisioned = state.provisioning.create_coaster(request).await?;
    Ok(web::Json(CoasterBody::from(provisioned)))
}

/// Provision up to 100 coasters in one call.
#[utoipa::path(
    post,
    path = "/api/v1/coasters/batch",
    request_body = BatchCreateCoastersRequestBody,
    responses(
        (status = 200, description = "Coasters provisioned", body = [CoasterBody]),
        (status = 400, description = "Invalid request or batch size", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["coasters"],
    operation_id = "batchCreateCoasters",
    security(("SessionCookie" = []))
)]
#[post("/coasters/batch")]
pub async fn batch_create_coasters(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BatchCreateCoastersRequestBody>,
) -> ApiResult<web::Json<Vec<CoasterBody>>> {
    session.require_admin()?;
    let body = payload.into_inner();
    if body.count == 0 || body.count > MAX_BATCH_SIZE {
        return Err(Error::invalid_request(format!(
            "batch size must be between 1 and {MAX_BATCH_SIZE}"
        ))
        .with_details(json!({ "field": "count", "value": body.count })));
    }
    let request = BatchCreateCoastersRequest {
        artwork_id: parse_uuid(&body.artwork_id, "artworkId")?,
        count: body.count,
        venue_id: body
            .venue_id
            .as_deref()
            .map(|raw| parse_uuid(raw, "venueId"))
            .transpose()?,
    };
    let provisioned = state.provisioning.batch_create(request).await?;
    Ok(web::Json(
        provisioned.into_iter().map(CoasterBody::from).collect(),
    ))
}

/// Resolve a coaster code for anonymous preview.
#[utoipa::path(
    get,
    path = "/api/v1/coasters/{code}",
    params(("code" = String, Path, description = "Coaster code")),
    responses(
        (status = 200, description = "Coaster preview", body = CoasterPreviewBody),
        (status = 400, description = "Invalid code", body = Error),
        (status = 404, description = "Unknown coaster code", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["coasters"],
    operation_id = "previewCoaster",
    security([])
)]
#[get("/coasters/{code}")]
pub async fn preview_coaster(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CoasterPreviewBody>> {
    let code = parse_code(&path.into_inner())?;
    let preview = state.scan_query.preview(&code).await?;
    Ok(web::Json(CoasterPreviewBody::from(preview)))
}

/// Most recently created artworks.
#[utoipa::path(
    get,
    path = "/api/v1/artworks/latest",
    responses(
        (status = 200, description = "Latest artworks", body = [ArtworkSummaryBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["artworks"],
    operation_id = "latestArtworks",
    security([])
)]
#[get("/artworks/latest")]
pub async fn latest_artworks(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ArtworkSummaryBody>>> {
    let summaries = state.scan_query.latest_artworks().await?;
    Ok(web::Json(
        summaries.into_iter().map(ArtworkSummaryBody::from).collect(),
    ))
}

#[cfg(test)]
#[path = "coasters_tests.rs"]
mod tests;
