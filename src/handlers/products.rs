// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::product::{
        AdvanceProductRequest, BoardColumn, BoardFilter, CreateProductRequest, MoveProductRequest,
        MoveResponse, MoveStatus, Product, ProductListEntry, StageHistoryEntry, UpdateProductRequest,
    },
    services::stage_tracker::MoveOutcome,
};

fn move_response(outcome: MoveOutcome) -> MoveResponse {
    match outcome {
        MoveOutcome::Moved(product) => MoveResponse {
            status: MoveStatus::Moved,
            product,
        },
        MoveOutcome::Unchanged(product) => MoveResponse {
            status: MoveStatus::Unchanged,
            product,
        },
    }
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "Todos os produtos", body = Vec<Product>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .stage_tracker
        .list_products()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(products)))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Produto criado na etapa inicial", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .stage_tracker
        .create_product(user.0.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products/board
#[utoipa::path(
    get,
    path = "/api/products/board",
    tag = "Products",
    params(BoardFilter),
    responses(
        (status = 200, description = "Uma coluna por etapa, na ordem do pipeline", body = Vec<BoardColumn>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<BoardFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let board = app_state
        .stage_tracker
        .board(filter.assigned_to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(board)))
}

// GET /api/products/list
#[utoipa::path(
    get,
    path = "/api/products/list",
    tag = "Products",
    responses(
        (status = 200, description = "Produtos com dias na etapa atual", body = Vec<ProductListEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_list_view(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .stage_tracker
        .list_view(Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .stage_tracker
        .get_product(product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Cadastro atualizado (a etapa não muda por aqui)", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .stage_tracker
        .update_product(product_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

// POST /api/products/{id}/move
#[utoipa::path(
    post,
    path = "/api/products/{id}/move",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = MoveProductRequest,
    responses(
        (status = 200, description = "Produto movido (ou já estava na etapa)", body = MoveResponse),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "O produto mudou de etapa durante a operação"),
        (status = 428, description = "Mudança para a etapa terminal sem confirmação")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<MoveProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .stage_tracker
        .move_product(
            user.0.id,
            product_id,
            payload.target_stage,
            payload.confirmed,
            payload.notes,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(move_response(outcome))))
}

// POST /api/products/{id}/advance
#[utoipa::path(
    post,
    path = "/api/products/{id}/advance",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = AdvanceProductRequest,
    responses(
        (status = 200, description = "Produto avançado para a próxima etapa", body = MoveResponse),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "O produto mudou de etapa durante a operação"),
        (status = 428, description = "Avanço para a etapa terminal sem confirmação")
    ),
    security(("api_jwt" = []))
)]
pub async fn advance_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    payload: Option<Json<AdvanceProductRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let outcome = app_state
        .stage_tracker
        .move_to_next_stage(user.0.id, product_id, payload.confirmed, payload.notes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(move_response(outcome))))
}

// GET /api/products/{id}/history
#[utoipa::path(
    get,
    path = "/api/products/{id}/history",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Intervalos de etapa, do mais antigo ao atual", body = Vec<StageHistoryEntry>),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .stage_tracker
        .history(product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(history)))
}
