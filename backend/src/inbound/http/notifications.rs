//! In-app notification handlers.
//!
//! `read-all` is registered ahead of `{id}/read` so the literal segment is
//! never parsed as an id.

use actix_web::{HttpResponse, get, put, web};
use serde_json::json;

use super::ApiResult;
use super::auth::Caller;
use super::envelope;
use super::state::HttpState;
use super::validation::{FieldName, parse_id};
use crate::domain::{NotificationFilter, NotificationId};

/// The caller's 50 most recent notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationFilter),
    responses(
        (status = 200, description = "Notifications"),
        (status = 400, description = "Invalid filter", body = super::ErrorEnvelope)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<NotificationFilter>,
) -> ApiResult<HttpResponse> {
    let notifications = state.notifications.list(&caller, filter.into_inner()).await?;
    Ok(envelope::ok(json!({ "notifications": notifications })))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses((status = 200, description = "Number of notifications marked read")),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[put("/notifications/read-all")]
pub async fn mark_all_notifications_read(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let updated = state.notifications.mark_all_read(&caller).await?;
    Ok(envelope::ok_with_message(
        json!({ "updated": updated }),
        "All notifications marked as read",
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read"),
        (status = 404, description = "Not found", body = super::ErrorEnvelope)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[put("/notifications/{id}/read")]
pub async fn mark_notification_read(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: NotificationId = parse_id(&path, FieldName::new("id"))?;
    let notification = state.notifications.mark_read(&caller, id).await?;
    Ok(envelope::ok(json!({ "notification": notification })))
}
