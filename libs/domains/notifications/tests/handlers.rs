//! REST surface tests against the in-memory store

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use domain_notifications::{
    InMemoryNotificationRepository, NotificationService, RecordingPublisher, SocketEventType,
    handlers,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    publisher: Arc<RecordingPublisher>,
}

impl TestApp {
    fn new() -> Self {
        let publisher = Arc::new(RecordingPublisher::new());
        let service =
            NotificationService::new(InMemoryNotificationRepository::new(), publisher.clone());
        Self {
            router: Router::new().nest("/notifications", handlers::router(service)),
            publisher,
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create(&self, user_id: &str, title: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/notifications",
                Some(json!({ "userId": user_id, "title": title, "message": "body" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["_id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_create_and_list() {
    let app = TestApp::new();
    app.create("u1", "first").await;
    app.create("u1", "second").await;
    app.create("u2", "other").await;

    let (status, body) = app.call(Method::GET, "/notifications?userId=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["limit"], 50);
    assert_eq!(body["pagination"]["offset"], 0);
    assert_eq!(body["unreadCount"], 2);
}

#[tokio::test]
async fn test_create_defaults_and_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .call(
            Method::POST,
            "/notifications",
            Some(json!({ "userId": "u1", "title": "Security", "message": "New login", "type": "security", "priority": "urgent" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "security");
    assert_eq!(body["data"]["priority"], "urgent");
    assert_eq!(body["data"]["status"], "unread");
    assert!(body["data"]["readAt"].is_null());

    let (status, body) = app
        .call(
            Method::POST,
            "/notifications",
            Some(json!({ "userId": "u1", "title": "", "message": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let app = TestApp::new();
    for title in ["a", "b", "c"] {
        app.create("u1", title).await;
    }
    let id = app.create("u1", "d").await;
    app.call(Method::PATCH, &format!("/notifications/{id}/read?userId=u1"), None)
        .await;

    let (_, body) = app
        .call(Method::GET, "/notifications?userId=u1&status=read", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["unreadCount"], 3);

    let (_, body) = app
        .call(Method::GET, "/notifications?userId=u1&limit=2&offset=1", None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(body["pagination"]["limit"], 2);
}

#[tokio::test]
async fn test_missing_user_id_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/notifications", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "userId is required");
}

#[tokio::test]
async fn test_get_is_user_scoped() {
    let app = TestApp::new();
    let id = app.create("u1", "mine").await;

    let (status, body) = app
        .call(Method::GET, &format!("/notifications/{id}?userId=u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "mine");

    let (status, body) = app
        .call(Method::GET, &format!("/notifications/{id}?userId=u2"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Notification not found");

    let (status, body) = app
        .call(Method::GET, "/notifications/not-a-uuid?userId=u1", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_id_answers_success_false_on_every_route() {
    let app = TestApp::new();
    let id = uuid::Uuid::now_v7();
    let expected = json!({ "success": false, "message": "Notification not found" });

    for (method, uri) in [
        (Method::GET, format!("/notifications/{id}?userId=u1")),
        (Method::PATCH, format!("/notifications/{id}/read?userId=u1")),
        (Method::PATCH, format!("/notifications/{id}/archive?userId=u1")),
        (Method::DELETE, format!("/notifications/{id}?userId=u1")),
    ] {
        let (status, body) = app.call(method, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, expected, "{uri}");
    }
    assert!(app.publisher.events().await.is_empty());
}

#[tokio::test]
async fn test_read_flow_and_unread_count() {
    let app = TestApp::new();
    let id = app.create("u1", "one").await;
    app.create("u1", "two").await;

    let (_, body) = app
        .call(Method::GET, "/notifications/unread-count?userId=u1", None)
        .await;
    assert_eq!(body, json!({ "success": true, "unreadCount": 2 }));

    let (status, body) = app
        .call(Method::PATCH, &format!("/notifications/{id}/read?userId=u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "read");
    assert!(body["data"]["readAt"].is_string());

    let (_, body) = app
        .call(Method::PATCH, "/notifications/mark-all-read?userId=u1", None)
        .await;
    assert_eq!(body, json!({ "success": true, "count": 1 }));

    let (_, body) = app
        .call(Method::GET, "/notifications/unread-count?userId=u1", None)
        .await;
    assert_eq!(body["unreadCount"], 0);
}

#[tokio::test]
async fn test_archive_and_delete() {
    let app = TestApp::new();
    let id = app.create("u1", "one").await;

    let (status, body) = app
        .call(Method::PATCH, &format!("/notifications/{id}/archive?userId=u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archived");
    let events_after_archive = app.publisher.events().await.len();
    assert_eq!(events_after_archive, 1);

    let (status, body) = app
        .call(Method::DELETE, &format!("/notifications/{id}?userId=u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let last = app.publisher.events().await.pop().unwrap();
    assert_eq!(last.event_type, SocketEventType::NotificationDeleted);

    let (status, body) = app
        .call(Method::DELETE, &format!("/notifications/{id}?userId=u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}
