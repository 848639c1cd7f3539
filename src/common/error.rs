use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale, models::product::Stage};

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Perfil de usuário não encontrado")]
    UserNotFound,

    #[error("Papel '{0}' necessário")]
    Forbidden(&'static str),

    #[error("{0} não encontrado")]
    ResourceNotFound(String),

    #[error("Mudança para '{0}' exige confirmação")]
    StageConfirmationRequired(Stage),

    #[error("O produto mudou de etapa durante a transição")]
    StageConflict,

    #[error("Estoque insuficiente: {0}")]
    InsufficientStock(String),

    #[error("Unidades fora do intervalo 0..={batch_size}")]
    BatchUnitsOutOfRange { batch_size: i32 },

    #[error("Controle de qualidade pendente")]
    QcNotPassed,

    #[error("Status incompatível com as unidades em estoque")]
    BatchStatusMismatch,

    #[error("Lote rejeitado não recebe unidades")]
    BatchRejected,

    #[error("Quantidade do lote fora do intervalo")]
    LotQuantityOutOfRange,

    #[error("Despesa já revisada")]
    ExpenseAlreadyReviewed,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::StageConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            AppError::StageConflict | AppError::ExpenseAlreadyReviewed => StatusCode::CONFLICT,
            AppError::InsufficientStock(_)
            | AppError::BatchUnitsOutOfRange { .. }
            | AppError::QcNotPassed
            | AppError::BatchStatusMismatch
            | AppError::BatchRejected
            | AppError::LotQuantityOutOfRange => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Traduz o erro para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();
        let lang = locale.0.as_str();

        let (key, params): (&str, Vec<(&str, String)>) = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                return ApiError {
                    status,
                    error: store.translate(lang, "validation_error", &[]),
                    details: Some(Value::Object(details)),
                };
            }
            AppError::InvalidToken => ("invalid_token", vec![]),
            AppError::UserNotFound => ("user_not_found", vec![]),
            AppError::Forbidden(role) => ("forbidden", vec![("role", role.to_string())]),
            AppError::ResourceNotFound(resource) => {
                ("resource_not_found", vec![("resource", resource.clone())])
            }
            AppError::StageConfirmationRequired(stage) => {
                ("stage_confirmation_required", vec![("stage", stage.label().to_string())])
            }
            AppError::StageConflict => ("stage_conflict", vec![]),
            AppError::InsufficientStock(detail) => {
                ("insufficient_stock", vec![("detail", detail.clone())])
            }
            AppError::BatchUnitsOutOfRange { batch_size } => {
                ("batch_units_out_of_range", vec![("batch_size", batch_size.to_string())])
            }
            AppError::QcNotPassed => ("qc_not_passed", vec![]),
            AppError::BatchStatusMismatch => ("batch_status_mismatch", vec![]),
            AppError::BatchRejected => ("batch_rejected", vec![]),
            AppError::LotQuantityOutOfRange => ("lot_quantity_out_of_range", vec![]),
            AppError::ExpenseAlreadyReviewed => ("expense_already_reviewed", vec![]),
            AppError::FontNotFound(path) => {
                tracing::error!("🔥 Fonte não encontrada em {}", path);
                ("font_not_found", vec![])
            }
            // Os demais viram 500. O detalhe vai só para o log.
            e => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", e);
                ("internal_error", vec![])
            }
        };

        ApiError {
            status,
            error: store.translate(lang, key, &params),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn stage_errors_map_to_precondition_and_conflict() {
        assert_eq!(
            AppError::StageConfirmationRequired(Stage::Launched).status_code(),
            StatusCode::PRECONDITION_REQUIRED
        );
        assert_eq!(AppError::StageConflict.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exhausted"));
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut e = ValidationError::new("range");
        e.message = Some("0 a 100".into());
        errors.add("progress", e);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Um ou mais campos são inválidos.");
        assert_eq!(api.details.unwrap()["progress"], json!(["0 a 100"]));
    }

    #[test]
    fn confirmation_message_names_the_stage() {
        let api = AppError::StageConfirmationRequired(Stage::Launched)
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.error, "Moving to 'Launched' must be confirmed.");
    }
}
