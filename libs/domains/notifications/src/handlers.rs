use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorResponse, NotificationError, NotificationResult};
use crate::models::{
    CreateNotification, DEFAULT_LIMIT, ListQuery, Notification, NotificationFilter,
    NotificationPriority, NotificationStatus, NotificationType, UserQuery,
};
use crate::repository::NotificationRepository;
use crate::service::NotificationService;

#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub total: u64,
    pub limit: i64,
    pub offset: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub success: bool,
    pub data: Vec<Notification>,
    pub pagination: Pagination,
    pub unread_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub success: bool,
    pub data: Notification,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub success: bool,
    pub unread_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// OpenAPI documentation for the Notifications API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_notifications,
        create_notification,
        unread_count,
        mark_all_read,
        get_notification,
        delete_notification,
        mark_read,
        archive_notification,
    ),
    components(schemas(
        Notification,
        CreateNotification,
        NotificationType,
        NotificationStatus,
        NotificationPriority,
        Pagination,
        NotificationListResponse,
        NotificationResponse,
        UnreadCountResponse,
        MarkAllReadResponse,
        SuccessResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Notifications", description = "In-app notifications, scoped by userId")
    )
)]
pub struct ApiDoc;

/// Routes relative to the `/notifications` mount point
pub fn router<R: NotificationRepository + 'static>(service: NotificationService<R>) -> Router {
    Router::new()
        .route("/", get(list_notifications::<R>).post(create_notification::<R>))
        .route("/unread-count", get(unread_count::<R>))
        .route("/mark-all-read", patch(mark_all_read::<R>))
        .route(
            "/{id}",
            get(get_notification::<R>).delete(delete_notification::<R>),
        )
        .route("/{id}/read", patch(mark_read::<R>))
        .route("/{id}/archive", patch(archive_notification::<R>))
        .with_state(Arc::new(service))
}

fn require_user(user_id: Option<String>) -> NotificationResult<String> {
    user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(NotificationError::MissingUserId)
}

/// Ids that are not UUIDs can not exist in the store
fn parse_id(raw: &str) -> NotificationResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| NotificationError::NotFound(Uuid::nil()))
}

/// List a user's notifications, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Notifications",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of notifications", body = NotificationListResponse),
        (status = 400, description = "userId missing", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
async fn list_notifications<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Query(query): Query<ListQuery>,
) -> NotificationResult<Json<NotificationListResponse>> {
    let mut filter = NotificationFilter::for_user(require_user(query.user_id)?).paginate(
        query.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    );
    filter.status = query.status;
    filter.notification_type = query.notification_type;
    filter.priority = query.priority;

    let page = service.get_notifications(filter).await?;
    Ok(Json(NotificationListResponse {
        success: true,
        data: page.items,
        pagination: Pagination {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        },
        unread_count: page.unread_count,
    }))
}

/// Create a notification
#[utoipa::path(
    post,
    path = "",
    tag = "Notifications",
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification created", body = NotificationResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
async fn create_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Json(input): Json<CreateNotification>,
) -> NotificationResult<impl IntoResponse> {
    let notification = service.create_notification(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(NotificationResponse {
            success: true,
            data: notification,
        }),
    ))
}

/// Unread notifications of a user
#[utoipa::path(
    get,
    path = "/unread-count",
    tag = "Notifications",
    params(UserQuery),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 400, description = "userId missing", body = ErrorResponse)
    )
)]
async fn unread_count<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Query(query): Query<UserQuery>,
) -> NotificationResult<Json<UnreadCountResponse>> {
    let user_id = require_user(query.user_id)?;
    Ok(Json(UnreadCountResponse {
        success: true,
        unread_count: service.get_unread_count(&user_id).await,
    }))
}

/// Mark every unread notification of a user as read
#[utoipa::path(
    patch,
    path = "/mark-all-read",
    tag = "Notifications",
    params(UserQuery),
    responses(
        (status = 200, description = "Number of notifications changed", body = MarkAllReadResponse),
        (status = 400, description = "userId missing", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
async fn mark_all_read<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Query(query): Query<UserQuery>,
) -> NotificationResult<Json<MarkAllReadResponse>> {
    let user_id = require_user(query.user_id)?;
    let count = service.mark_all_as_read(&user_id).await?;
    Ok(Json(MarkAllReadResponse {
        success: true,
        count,
    }))
}

/// Get one notification
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Notification ID"), UserQuery),
    responses(
        (status = 200, description = "Notification found, or `success: false` when the user has no such notification", body = NotificationResponse),
        (status = 400, description = "userId missing", body = ErrorResponse)
    )
)]
async fn get_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
) -> NotificationResult<Json<NotificationResponse>> {
    let user_id = require_user(query.user_id)?;
    let id = parse_id(&id)?;
    let notification = service
        .get_notification_by_id(id, &user_id)
        .await?
        .ok_or(NotificationError::NotFound(id))?;
    Ok(Json(NotificationResponse {
        success: true,
        data: notification,
    }))
}

/// Mark one notification as read
#[utoipa::path(
    patch,
    path = "/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Notification ID"), UserQuery),
    responses(
        (status = 200, description = "Notification marked as read, or `success: false` when the user has no such notification", body = NotificationResponse),
        (status = 400, description = "userId missing", body = ErrorResponse)
    )
)]
async fn mark_read<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
) -> NotificationResult<Json<NotificationResponse>> {
    let user_id = require_user(query.user_id)?;
    let id = parse_id(&id)?;
    let notification = service
        .mark_as_read(id, &user_id)
        .await?
        .ok_or(NotificationError::NotFound(id))?;
    Ok(Json(NotificationResponse {
        success: true,
        data: notification,
    }))
}

/// Archive one notification
#[utoipa::path(
    patch,
    path = "/{id}/archive",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Notification ID"), UserQuery),
    responses(
        (status = 200, description = "Notification archived, or `success: false` when the user has no such notification", body = NotificationResponse),
        (status = 400, description = "userId missing", body = ErrorResponse)
    )
)]
async fn archive_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
) -> NotificationResult<Json<NotificationResponse>> {
    let user_id = require_user(query.user_id)?;
    let id = parse_id(&id)?;
    let notification = service
        .archive_notification(id, &user_id)
        .await?
        .ok_or(NotificationError::NotFound(id))?;
    Ok(Json(NotificationResponse {
        success: true,
        data: notification,
    }))
}

/// Delete one notification
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "Notification ID"), UserQuery),
    responses(
        (status = 200, description = "Notification deleted, or `success: false` when the user has no such notification", body = SuccessResponse),
        (status = 400, description = "userId missing", body = ErrorResponse)
    )
)]
async fn delete_notification<R: NotificationRepository>(
    State(service): State<Arc<NotificationService<R>>>,
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
) -> NotificationResult<Json<SuccessResponse>> {
    let user_id = require_user(query.user_id)?;
    let id = parse_id(&id)?;
    if !service.delete_notification(id, &user_id).await? {
        return Err(NotificationError::NotFound(id));
    }
    Ok(Json(SuccessResponse { success: true }))
}
