// src/handlers/system.rs

use axum::{extract::State, http::StatusCode};

use crate::{common::error::ApiError, config::AppState, middleware::i18n::Locale};

// GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

// Qualquer rota desconhecida
pub async fn not_found(State(app_state): State<AppState>, locale: Locale) -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        error: app_state.i18n_store.translate(&locale.0, "route_not_found", &[]),
        details: None,
    }
}
