// src/models/ingredient.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::batch::validate_positive;

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lot_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    Depleted,
    Expired,
    Quarantined,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    #[schema(example = "Ácido Hialurônico")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,
    /// Abaixo deste total o insumo entra nos alertas.
    #[schema(example = "1.5")]
    pub reorder_level: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Lote de estoque de um insumo (o que chegou do fornecedor)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLot {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub vendor_id: Option<Uuid>,
    #[schema(example = "HA-2291")]
    pub lot_number: Option<String>,
    #[schema(example = "3.250")]
    pub quantity: Decimal,
    #[schema(example = "5.000")]
    pub original_quantity: Decimal,
    #[schema(example = "189.90")]
    pub unit_cost: Option<Decimal>,
    #[schema(value_type = String, format = Date)]
    pub received_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
    pub status: LotStatus,
    pub created_at: DateTime<Utc>,
}

// Consolidação por insumo (total em estoque + validade mais próxima)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientStock {
    pub ingredient: Ingredient,
    pub total_stock: Decimal,
    #[schema(value_type = Option<String>, format = Date)]
    pub earliest_expiry: Option<NaiveDate>,
    pub low_stock: bool,
    pub expiring_soon: bool,
}

impl IngredientStock {
    pub fn needs_attention(&self) -> bool {
        self.low_stock || self.expiring_soon
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    #[schema(example = "kg")]
    pub unit: String,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub reorder_level: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockLotRequest {
    pub vendor_id: Option<Uuid>,
    pub lot_number: Option<String>,
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "5.0")]
    pub quantity: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub received_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeLotRequest {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "0.75")]
    pub quantity: Decimal,
}
