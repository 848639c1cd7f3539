// src/handlers/licenses.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_session_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::license::{LicenseRequest, LicenseView},
};

fn validate_license(payload: &LicenseRequest) -> Result<(), AppError> {
    payload.validate()?;

    // Regra de consistência entre as datas
    payload.validate_dates().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("expiryDate", e);
        AppError::ValidationError(errors)
    })
}

// GET /api/licenses
#[utoipa::path(
    get,
    path = "/api/licenses",
    tag = "Licenses",
    responses((status = 200, description = "Licenças, mais urgentes primeiro", body = Vec<LicenseView>)),
    security(("api_jwt" = []))
)]
pub async fn list_licenses(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let licenses = app_state
        .license_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(licenses)))
}

// GET /api/licenses/expiring
#[utoipa::path(
    get,
    path = "/api/licenses/expiring",
    tag = "Licenses",
    responses((status = 200, description = "Vencidas ou vencendo em até 90 dias", body = Vec<LicenseView>)),
    security(("api_jwt" = []))
)]
pub async fn list_expiring(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let licenses = app_state
        .license_service
        .expiring()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(licenses)))
}

// POST /api/licenses
#[utoipa::path(
    post,
    path = "/api/licenses",
    tag = "Licenses",
    request_body = LicenseRequest,
    responses(
        (status = 201, description = "Licença cadastrada", body = LicenseView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_license(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<LicenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_license(&payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let license = app_state
        .license_service
        .create(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(license)))
}

// GET /api/licenses/{id}
#[utoipa::path(
    get,
    path = "/api/licenses/{id}",
    tag = "Licenses",
    params(("id" = Uuid, Path, description = "ID da licença")),
    responses(
        (status = 200, description = "Licença", body = LicenseView),
        (status = 404, description = "Licença não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_license(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(license_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let license = app_state
        .license_service
        .get(license_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(license)))
}

// PUT /api/licenses/{id}
#[utoipa::path(
    put,
    path = "/api/licenses/{id}",
    tag = "Licenses",
    params(("id" = Uuid, Path, description = "ID da licença")),
    request_body = LicenseRequest,
    responses(
        (status = 200, description = "Licença atualizada", body = LicenseView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Licença não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_license(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(license_id): Path<Uuid>,
    Json(payload): Json<LicenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_license(&payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let license = app_state
        .license_service
        .update(&mut *conn, license_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(license)))
}
