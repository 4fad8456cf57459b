//! Notification endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::NotificationId;
use record_store::{Notification, NotificationStore, RecordStore};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub notification: Notification,
}

/// GET /notifications — list the caller's notifications, newest first.
#[tracing::instrument(skip(state, user))]
pub async fn list<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let notifications = state.store.notifications_for(user.0.id).await?;
    Ok(Json(NotificationsResponse {
        success: true,
        notifications,
    }))
}

/// PATCH /notifications/:id/read — mark one of the caller's notifications
/// read.
///
/// Another user's notification id is indistinguishable from a missing one.
#[tracing::instrument(skip(state, user))]
pub async fn mark_read<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification_id = Uuid::parse_str(&id)
        .map(NotificationId::from_uuid)
        .map_err(|err| ApiError::BadRequest(format!("Invalid notification id: {err}")))?;

    let notification = state
        .store
        .mark_read(notification_id, user.0.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(NotificationResponse {
        success: true,
        notification,
    }))
}
