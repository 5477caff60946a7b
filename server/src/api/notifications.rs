//! Notification feed API endpoints.
//!
//! - GET `/api/notifications/user/:user_id` - a user's feed, newest first
//! - GET `/api/notifications/user/:user_id/unread-count`
//! - PUT `/api/notifications/user/:user_id/read-all`
//! - PUT `/api/notifications/:id/read`

use crate::error::AppError;
use crate::notifications::{Notification, NotificationId};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ridepool_core::UserId;
use serde::Serialize;
use uuid::Uuid;

/// Response carrying a user's unread notification count.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    /// Unread notifications
    pub unread: usize,
}

/// Response after marking a user's feed as read.
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    /// Notifications that changed from unread to read
    pub updated: usize,
}

/// List a user's notifications, newest first.
pub async fn list_user_notifications(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Json<Vec<Notification>> {
    Json(state.notifications.for_user(UserId::from_uuid(user_id)))
}

/// Count a user's unread notifications.
pub async fn unread_count(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Json<UnreadCountResponse> {
    Json(UnreadCountResponse {
        unread: state.notifications.unread_count(UserId::from_uuid(user_id)),
    })
}

/// Mark one notification as read.
///
/// # Errors
///
/// Returns `404` for an unknown notification.
pub async fn mark_read(
    Path(notification_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state
        .notifications
        .mark_read(NotificationId::from_uuid(notification_id))
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Notification", notification_id))
    }
}

/// Mark every notification of a user as read.
pub async fn mark_all_read(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Json<MarkAllReadResponse> {
    Json(MarkAllReadResponse {
        updated: state
            .notifications
            .mark_all_read(UserId::from_uuid(user_id)),
    })
}
