//! Admin dashboard handlers.
//!
//! ```text
//! GET /api/v1/admin/dashboard
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::domain::ports::DashboardSnapshot;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Load the admin dashboard snapshot.
///
/// The snapshot types already carry their serde contracts, so the port
/// payload is returned to the client as-is.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardSnapshot),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDashboard",
    security(("SessionCookie" = []))
)]
#[get("/admin/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardSnapshot>> {
    session.require_admin()?;
    let snapshot = state.dashboard.snapshot().await?;
    Ok(web::Json(snapshot))
}
