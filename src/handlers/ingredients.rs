// src/handlers/ingredients.rs

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
    models::ingredient::{
        ConsumeLotRequest, CreateIngredientRequest, CreateStockLotRequest, Ingredient, IngredientStock,
        StockLot,
    },
};

// GET /api/ingredients
#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "Ingredients",
    responses((status = 200, description = "Insumos cadastrados", body = Vec<Ingredient>)),
    security(("api_jwt" = []))
)]
pub async fn list_ingredients(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let ingredients = app_state
        .ingredient_service
        .list_ingredients()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ingredients)))
}

// POST /api/ingredients
#[utoipa::path(
    post,
    path = "/api/ingredients",
    tag = "Ingredients",
    request_body = CreateIngredientRequest,
    responses(
        (status = 201, description = "Insumo criado", body = Ingredient),
        (status = 400, description = "Dados inválidos ou nome duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ingredient(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateIngredientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let ingredient = app_state
        .ingredient_service
        .create_ingredient(&mut *conn, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ingredient)))
}

// GET /api/ingredients/stock
#[utoipa::path(
    get,
    path = "/api/ingredients/stock",
    tag = "Ingredients",
    responses((status = 200, description = "Estoque consolidado por insumo", body = Vec<IngredientStock>)),
    security(("api_jwt" = []))
)]
pub async fn stock_overview(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let stock = app_state
        .ingredient_service
        .stock_overview()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stock)))
}

// GET /api/ingredients/alerts
#[utoipa::path(
    get,
    path = "/api/ingredients/alerts",
    tag = "Ingredients",
    responses((status = 200, description = "Insumos com estoque baixo ou vencendo", body = Vec<IngredientStock>)),
    security(("api_jwt" = []))
)]
pub async fn stock_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = app_state
        .ingredient_service
        .alerts()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(alerts)))
}

// GET /api/ingredients/{id}/lots
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/lots",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "ID do insumo")),
    responses(
        (status = 200, description = "Lotes do insumo", body = Vec<StockLot>),
        (status = 404, description = "Insumo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_lots(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(ingredient_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lots = app_state
        .ingredient_service
        .list_lots(ingredient_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lots)))
}

// POST /api/ingredients/{id}/lots
#[utoipa::path(
    post,
    path = "/api/ingredients/{id}/lots",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "ID do insumo")),
    request_body = CreateStockLotRequest,
    responses(
        (status = 201, description = "Lote recebido", body = StockLot),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Insumo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_lot(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(ingredient_id): Path<Uuid>,
    Json(payload): Json<CreateStockLotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let lot = app_state
        .ingredient_service
        .add_lot(&mut *conn, ingredient_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lot)))
}

// POST /api/ingredients/lots/{lot_id}/consume
#[utoipa::path(
    post,
    path = "/api/ingredients/lots/{lot_id}/consume",
    tag = "Ingredients",
    params(("lot_id" = Uuid, Path, description = "ID do lote de insumo")),
    request_body = ConsumeLotRequest,
    responses(
        (status = 200, description = "Baixa registrada", body = StockLot),
        (status = 404, description = "Lote não encontrado"),
        (status = 422, description = "Quantidade maior que o saldo do lote")
    ),
    security(("api_jwt" = []))
)]
pub async fn consume_lot(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(lot_id): Path<Uuid>,
    Json(payload): Json<ConsumeLotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let lot = app_state
        .ingredient_service
        .consume_lot(&mut *conn, lot_id, payload.quantity)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lot)))
}
