// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{db_utils::get_session_connection, error::ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores do ateliê", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .dashboard_service
        .get_summary(&mut *conn)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
