// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Profile,
};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = Profile),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::OK, Json(user.0)))
}

// GET /api/users
// Lista usada para atribuir sócios aos produtos
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Perfis cadastrados", body = Vec<Profile>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let profiles = app_state
        .auth_service
        .list_profiles()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profiles)))
}
