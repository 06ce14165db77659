//! HTTP surface: probes, metrics, OpenAPI document and the notifications API

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use database::mongodb::check_health_detailed;
use domain_notifications::{NotificationRepository, NotificationService};
use email::EmailDispatchService;
use metrics_exporter_prometheus::PrometheusHandle;
use mongodb::Database;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notifications API",
        version = "0.1.0",
        description = "In-app notifications for users, fed by transaction and notification events",
        license(name = "MIT")
    ),
    nest(
        (path = "/notifications", api = domain_notifications::ApiDoc)
    ),
    tags(
        (name = "notifications", description = "Per-user notification inbox")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub email: Arc<EmailDispatchService>,
    pub metrics: Option<PrometheusHandle>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub services: ServiceStatus,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub database: bool,
    pub email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
}

/// Full application router
pub fn app<R: NotificationRepository + 'static>(
    state: AppState,
    notifications: NotificationService<R>,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi))
        .with_state(state)
        .nest(
            "/notifications",
            domain_notifications::handlers::router(notifications),
        )
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Ready once MongoDB answers. Email is reported but optional.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let database = check_health_detailed(&state.db).await;
    if !database.healthy {
        tracing::error!(error = ?database.message, "Readiness check failed: database");
    }

    let status = if database.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            ready: database.healthy,
            services: ServiceStatus {
                database: database.healthy,
                email: state.email.is_ready(),
                database_error: database.message,
            },
        }),
    )
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
