//! Server construction and middleware wiring.

mod config;

pub use config::{DEFAULT_SHARE_DOMAIN, ServerConfig};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{DashboardService, ProvisioningService, ScanService};
use crate::inbound::http::coasters::{
    batch_create_coasters, create_coaster, latest_artworks, preview_coaster,
};
use crate::inbound::http::dashboard::dashboard;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::scans::{list_scans, record_guest_comment, record_scan};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::login;
use crate::middleware::trace::Trace;
use crate::outbound::persistence::{
    DieselCoasterRepository, DieselDashboardRepository, DieselLoginService, DieselScanStore,
};

/// Build the shared HTTP state from configured ports.
///
/// With a pool the state is fully database-backed; without one every port
/// falls back to its fixture so the server stays usable for local
/// development and tests.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let Some(pool) = &config.db_pool else {
        return web::Data::new(HttpState::default());
    };

    let coaster_repo = Arc::new(DieselCoasterRepository::new(pool.clone()));
    let scan_store = Arc::new(DieselScanStore::new(pool.clone()));
    let scan_service = Arc::new(ScanService::new(coaster_repo.clone(), scan_store));
    let dashboard_repo = Arc::new(DieselDashboardRepository::new(pool.clone()));

    web::Data::new(HttpState {
        login: Arc::new(DieselLoginService::new(pool.clone())),
        provisioning: Arc::new(ProvisioningService::new(
            coaster_repo,
            config.share_domain.clone(),
        )),
        scans: scan_service.clone(),
        scan_query: scan_service,
        dashboard: Arc::new(DashboardService::new(dashboard_repo)),
    })
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(record_scan)
        .service(list_scans)
        .service(record_guest_comment)
        .service(create_coaster)
        .service(batch_create_coasters)
        .service(preview_coaster)
        .service(latest_artworks)
        .service(dashboard);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        share_domain: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
