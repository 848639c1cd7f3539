// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_session_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::notification::{Notification, UnreadCount},
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Minhas notificações (mais recentes primeiro)", body = Vec<Notification>)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = app_state
        .notification_service
        .list_mine(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(notifications)))
}

// GET /api/notifications/unread-count
// O cliente consulta este endpoint periodicamente para atualizar o sino.
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    tag = "Notifications",
    responses((status = 200, description = "Quantidade de não lidas", body = UnreadCount)),
    security(("api_jwt" = []))
)]
pub async fn unread_count(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let count = app_state
        .notification_service
        .unread_count(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(count)))
}

// POST /api/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 204, description = "Marcada como lida"),
        (status = 404, description = "Notificação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .notification_service
        .mark_read(&mut *conn, user.0.id, notification_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/notifications/read-all
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    responses((status = 200, description = "Quantas foram marcadas como lidas")),
    security(("api_jwt" = []))
)]
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .notification_service
        .mark_all_read(&mut *conn, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "updated": updated }))))
}
