// src/models/expense.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::batch::validate_positive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[schema(example = "Frascos âmbar 30ml")]
    pub description: String,
    #[schema(example = "842.50")]
    pub amount: Decimal,
    #[schema(example = "Embalagens")]
    pub category: String,
    #[schema(value_type = String, format = Date)]
    pub expense_date: NaiveDate,
    pub vendor_id: Option<Uuid>,
    /// URL pública do comprovante (o upload é feito direto no storage externo).
    pub bill_url: Option<String>,
    pub status: ExpenseStatus,
    pub submitted_by: Uuid,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "842.50")]
    pub amount: Decimal,
    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,
    #[schema(value_type = String, format = Date)]
    pub expense_date: NaiveDate,
    pub vendor_id: Option<Uuid>,
    pub bill_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn status(self) -> ExpenseStatus {
        match self {
            ReviewDecision::Approve => ExpenseStatus::Approved,
            ReviewDecision::Reject => ExpenseStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewExpenseRequest {
    pub decision: ReviewDecision,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilter {
    /// Mês no formato `AAAA-MM`.
    pub month: Option<String>,
}

// --- Resumo ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    /// Participação no total geral, em %, com 2 casas.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total: Decimal,
    pub approved: Decimal,
    pub pending: Decimal,
    pub rejected: Decimal,
    pub count: usize,
    pub by_category: Vec<CategoryTotal>,
}
