//! HTTP surface of the worker, without a live database or mail provider

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use domain_notifications::{InMemoryNotificationRepository, NotificationService, RecordingPublisher};
use email::{
    DispatchSettings, EmailDispatchService, EmailProviderKind, InMemoryDeliveryRepository,
    TemplateEngine,
};
use http_body_util::BodyExt;
use notifications_worker::server::{AppState, app};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Points at a closed port so database pings fail fast
const UNREACHABLE_MONGO: &str =
    "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

async fn test_app() -> Router {
    let client = mongodb::Client::with_uri_str(UNREACHABLE_MONGO).await.unwrap();
    let email = EmailDispatchService::from_transport(
        None,
        DispatchSettings {
            provider: EmailProviderKind::Mailgun,
            from: "noreply@example.com".into(),
            max_retry: 3,
        },
        Arc::new(TemplateEngine::new().unwrap()),
        Arc::new(InMemoryDeliveryRepository::new()),
    )
    .await;

    let state = AppState {
        db: client.database("notifications_test"),
        email: Arc::new(email),
        metrics: None,
    };
    let notifications = NotificationService::new(
        InMemoryNotificationRepository::new(),
        Arc::new(RecordingPublisher::new()),
    );
    app(state, notifications)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(test_app().await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "notifications_worker");
}

#[tokio::test]
async fn test_ready_reports_database_down() {
    let (status, body) = get(test_app().await, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
    assert_eq!(body["services"]["database"], false);
    assert_eq!(body["services"]["email"], false);
}

#[tokio::test]
async fn test_metrics_disabled() {
    let (status, _) = get(test_app().await, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_lists_notification_routes() {
    let (status, body) = get(test_app().await, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/notifications"));
    assert!(paths.contains_key("/notifications/unread-count"));
}

#[tokio::test]
async fn test_notifications_are_mounted() {
    let router = test_app().await;

    let (status, body) = get(router.clone(), "/notifications?userId=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unreadCount"], 0);

    let (status, body) = get(router, "/notifications/unread-count").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "userId is required");
}
