// src/handlers/batches.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
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
    models::batch::{
        AdjustUnitsRequest, Batch, BatchFilter, BatchTrace, CreateBatchRequest, QcChecklist,
        SetBatchStatusRequest,
    },
};

// GET /api/batches
#[utoipa::path(
    get,
    path = "/api/batches",
    tag = "Batches",
    params(BatchFilter),
    responses(
        (status = 200, description = "Lotes de produção (mais recentes primeiro)", body = Vec<Batch>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_batches(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<BatchFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let batches = app_state
        .batch_service
        .list_batches(filter.product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(batches)))
}

// POST /api/batches
#[utoipa::path(
    post,
    path = "/api/batches",
    tag = "Batches",
    request_body = CreateBatchRequest,
    responses(
        (status = 201, description = "Lote criado em quarentena, com baixa dos insumos", body = Batch),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto ou lote de insumo não encontrado"),
        (status = 422, description = "Estoque de insumo insuficiente ou unidades acima do lote")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let batch = app_state
        .batch_service
        .create_batch(&mut *conn, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(batch)))
}

// GET /api/batches/{id}
#[utoipa::path(
    get,
    path = "/api/batches/{id}",
    tag = "Batches",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote", body = Batch),
        (status = 404, description = "Lote não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = app_state
        .batch_service
        .get_batch(batch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(batch)))
}

// POST /api/batches/{id}/units
#[utoipa::path(
    post,
    path = "/api/batches/{id}/units",
    tag = "Batches",
    params(("id" = Uuid, Path, description = "ID do lote")),
    request_body = AdjustUnitsRequest,
    responses(
        (status = 200, description = "Unidades ajustadas", body = Batch),
        (status = 404, description = "Lote não encontrado"),
        (status = 422, description = "Resultado fora de 0..=tamanho do lote ou lote rejeitado recebendo unidades")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_units(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(batch_id): Path<Uuid>,
    Json(payload): Json<AdjustUnitsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let batch = app_state
        .batch_service
        .adjust_units(&mut *conn, batch_id, payload.delta)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(batch)))
}

// PUT /api/batches/{id}/qc
#[utoipa::path(
    put,
    path = "/api/batches/{id}/qc",
    tag = "Batches",
    params(("id" = Uuid, Path, description = "ID do lote")),
    request_body = QcChecklist,
    responses(
        (status = 200, description = "Checklist de qualidade gravado", body = Batch),
        (status = 404, description = "Lote não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_qc(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(batch_id): Path<Uuid>,
    Json(payload): Json<QcChecklist>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let batch = app_state
        .batch_service
        .update_qc(&mut *conn, batch_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(batch)))
}

// PUT /api/batches/{id}/status
#[utoipa::path(
    put,
    path = "/api/batches/{id}/status",
    tag = "Batches",
    params(("id" = Uuid, Path, description = "ID do lote")),
    request_body = SetBatchStatusRequest,
    responses(
        (status = 200, description = "Status alterado", body = Batch),
        (status = 404, description = "Lote não encontrado"),
        (status = 422, description = "Controle de qualidade incompleto ou status incompatível com as unidades")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(batch_id): Path<Uuid>,
    Json(payload): Json<SetBatchStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let batch = app_state
        .batch_service
        .set_status(&mut *conn, batch_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(batch)))
}

// GET /api/batches/{id}/trace
#[utoipa::path(
    get,
    path = "/api/batches/{id}/trace",
    tag = "Batches",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote com os lotes de insumo consumidos", body = BatchTrace),
        (status = 404, description = "Lote não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn trace_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let trace = app_state
        .batch_service
        .trace(batch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(trace)))
}

// GET /api/batches/{id}/label
#[utoipa::path(
    get,
    path = "/api/batches/{id}/label",
    tag = "Batches",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Etiqueta em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Lote não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn batch_label(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(batch_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (batch_number, pdf_bytes) = app_state
        .batch_service
        .label_pdf(batch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"etiqueta_{}.pdf\"", batch_number),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
