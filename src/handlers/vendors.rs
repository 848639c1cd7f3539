// src/handlers/vendors.rs

use axum::{
    extract::{Path, Query, State},
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
    models::vendor::{Vendor, VendorFilter, VendorRequest},
};

// GET /api/vendors
#[utoipa::path(
    get,
    path = "/api/vendors",
    tag = "Vendors",
    params(VendorFilter),
    responses((status = 200, description = "Fornecedores (ativos, salvo pedido em contrário)", body = Vec<Vendor>)),
    security(("api_jwt" = []))
)]
pub async fn list_vendors(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<VendorFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let vendors = app_state
        .vendor_service
        .list(filter.include_inactive)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(vendors)))
}

// POST /api/vendors
#[utoipa::path(
    post,
    path = "/api/vendors",
    tag = "Vendors",
    request_body = VendorRequest,
    responses(
        (status = 201, description = "Fornecedor cadastrado", body = Vendor),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<VendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let vendor = app_state
        .vendor_service
        .create(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(vendor)))
}

// GET /api/vendors/{id}
#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor", body = Vendor),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(vendor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vendor = app_state
        .vendor_service
        .get(vendor_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(vendor)))
}

// PUT /api/vendors/{id}
#[utoipa::path(
    put,
    path = "/api/vendors/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    request_body = VendorRequest,
    responses(
        (status = 200, description = "Fornecedor atualizado (isActive=false desativa)", body = Vendor),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(vendor_id): Path<Uuid>,
    Json(payload): Json<VendorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let vendor = app_state
        .vendor_service
        .update(&mut *conn, vendor_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(vendor)))
}
