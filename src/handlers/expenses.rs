// src/handlers/expenses.rs

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
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admin, RequireRole},
    },
    models::expense::{CreateExpenseRequest, Expense, ExpenseFilter, ExpenseSummary, ReviewExpenseRequest},
};

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(ExpenseFilter),
    responses(
        (status = 200, description = "Despesas (mais recentes primeiro)", body = Vec<Expense>),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<ExpenseFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = app_state
        .expense_service
        .list(filter.month.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expenses)))
}

// GET /api/expenses/summary
#[utoipa::path(
    get,
    path = "/api/expenses/summary",
    tag = "Expenses",
    params(ExpenseFilter),
    responses(
        (status = 200, description = "Totais por status e por categoria", body = ExpenseSummary),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(filter): Query<ExpenseFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .expense_service
        .summary(filter.month.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Despesa lançada como pendente", body = Expense),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_service
        .create(&mut *conn, user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// POST /api/expenses/{id}/review
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/review",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    request_body = ReviewExpenseRequest,
    responses(
        (status = 200, description = "Despesa aprovada ou rejeitada", body = Expense),
        (status = 403, description = "Apenas administradores revisam despesas"),
        (status = 404, description = "Despesa não encontrada"),
        (status = 409, description = "Despesa já revisada")
    ),
    security(("api_jwt" = []))
)]
pub async fn review_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<Admin>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ReviewExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_session_connection(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_service
        .review(&mut *conn, &user.0, expense_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expense)))
}
