//! HTTP handlers for the activity feed

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::Notification;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::NotificationService;
use crate::AppState;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked: usize,
}

fn service(state: &AppState) -> NotificationService {
    NotificationService::new(state.store.clone(), &state.config)
}

/// Feed entries, newest first
pub async fn get_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let mut notifications = service(&state).list(query.unread_only.unwrap_or(false))?;
    notifications.reverse();
    if let Some(limit) = query.limit {
        notifications.truncate(limit);
    }
    Ok(Json(notifications))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
) -> AppResult<Json<UnreadCountResponse>> {
    let unread_count = service(&state).unread_count()?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    Ok(Json(service(&state).mark_read(notification_id)?))
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
) -> AppResult<Json<MarkAllReadResponse>> {
    let marked = service(&state).mark_all_read()?;
    Ok(Json(MarkAllReadResponse { marked }))
}
