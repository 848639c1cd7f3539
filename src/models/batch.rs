// src/models/batch.rs

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "batch_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Quarantine, // Aguardando controle de qualidade
    Released,
    Rejected,
    Depleted,   // Estoque zerado
}

// Checklist de controle de qualidade (gravado como JSONB)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QcChecklist {
    pub appearance: bool,
    pub color: bool,
    pub odor: bool,
    pub ph: bool,
    pub viscosity: bool,
    pub packaging_integrity: bool,
    pub label_accuracy: bool,
}

impl QcChecklist {
    pub fn passed(&self) -> bool {
        self.appearance
            && self.color
            && self.odor
            && self.ph
            && self.viscosity
            && self.packaging_integrity
            && self.label_accuracy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = "SRUM-20250312-01")]
    pub batch_number: String,
    #[schema(value_type = String, format = Date, example = "2025-03-12")]
    pub manufacturing_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2027-03-12")]
    pub expiry_date: NaiveDate,
    #[schema(example = 500)]
    pub batch_size: i32,
    #[schema(example = 480)]
    pub units_in_stock: i32,
    #[schema(value_type = QcChecklist)]
    pub qc_checklist: Json<QcChecklist>,
    pub status: BatchStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Insumo consumido por um lote, já com os nomes para a rastreabilidade
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TracedLot {
    pub stock_lot_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub lot_number: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub vendor_name: Option<String>,
    #[schema(example = "2.500")]
    pub quantity: Decimal,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchTrace {
    #[serde(flatten)]
    pub batch: Batch,
    pub product_name: String,
    pub ingredients: Vec<TracedLot>,
}

// --- Payloads ---

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientUsage {
    pub stock_lot_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "2.5")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub product_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-03-12")]
    pub manufacturing_date: NaiveDate,
    #[validate(range(min = 1, message = "O tamanho do lote deve ser maior que zero."))]
    #[schema(example = 500)]
    pub batch_size: i32,
    /// Quando omitido, o lote nasce com todas as unidades em estoque.
    #[validate(range(min = 0, message = "As unidades não podem ser negativas."))]
    pub units_in_stock: Option<i32>,
    pub notes: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub ingredients: Vec<IngredientUsage>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustUnitsRequest {
    /// Positivo devolve unidades ao estoque, negativo dá baixa.
    #[schema(example = -12)]
    pub delta: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetBatchStatusRequest {
    pub status: BatchStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BatchFilter {
    pub product_id: Option<Uuid>,
}

// --- Regras de derivação ---

/// Validade = fabricação + meses de validade do produto (ajustada ao fim do mês quando necessário).
pub fn expiry_date_for(manufacturing_date: NaiveDate, shelf_life_months: i32) -> Option<NaiveDate> {
    let months = u32::try_from(shelf_life_months).ok().filter(|m| *m > 0)?;
    manufacturing_date.checked_add_months(Months::new(months))
}

/// Número do lote: `{PREFIXO}-{AAAAMMDD}-{NN}`.
/// `sequence` é a quantidade de lotes do produto na mesma data + 1; não é único sob tentativas concorrentes.
pub fn derive_batch_number(product_name: &str, manufacturing_date: NaiveDate, sequence: i64) -> String {
    let prefix: String = product_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_ascii_uppercase();
    let prefix = if prefix.is_empty() { "PRD".to_string() } else { prefix };

    format!("{}-{}-{:02}", prefix, manufacturing_date.format("%Y%m%d"), sequence)
}

/// Aplica uma variação de unidades mantendo `0 <= unidades <= tamanho do lote`.
pub fn apply_units_delta(units_in_stock: i32, batch_size: i32, delta: i32) -> Option<i32> {
    let updated = units_in_stock.checked_add(delta)?;
    (0..=batch_size).contains(&updated).then_some(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expiry_adds_shelf_life_in_calendar_months() {
        assert_eq!(expiry_date_for(date(2025, 3, 12), 24), Some(date(2027, 3, 12)));
        assert_eq!(expiry_date_for(date(2025, 3, 12), 6), Some(date(2025, 9, 12)));
    }

    #[test]
    fn expiry_clamps_to_end_of_month() {
        assert_eq!(expiry_date_for(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(expiry_date_for(date(2023, 8, 31), 6), Some(date(2024, 2, 29)));
    }

    #[test]
    fn expiry_rejects_non_positive_shelf_life() {
        assert_eq!(expiry_date_for(date(2025, 1, 1), 0), None);
        assert_eq!(expiry_date_for(date(2025, 1, 1), -3), None);
    }

    #[test]
    fn batch_number_uses_name_prefix_date_and_sequence() {
        assert_eq!(
            derive_batch_number("Sérum Vitamina C", date(2025, 3, 12), 1),
            "SRUM-20250312-01"
        );
        assert_eq!(derive_batch_number("lip oil", date(2025, 3, 12), 12), "LIPO-20250312-12");
        assert_eq!(derive_batch_number("***", date(2025, 3, 12), 3), "PRD-20250312-03");
    }

    #[test]
    fn units_stay_within_batch_bounds() {
        assert_eq!(apply_units_delta(10, 100, -10), Some(0));
        assert_eq!(apply_units_delta(10, 100, 90), Some(100));
        assert_eq!(apply_units_delta(10, 100, -11), None);
        assert_eq!(apply_units_delta(10, 100, 91), None);
        assert_eq!(apply_units_delta(i32::MAX, i32::MAX, 1), None);
    }

    #[test]
    fn qc_passes_only_when_every_flag_is_set() {
        let mut qc = QcChecklist {
            appearance: true,
            color: true,
            odor: true,
            ph: true,
            viscosity: true,
            packaging_integrity: true,
            label_accuracy: true,
        };
        assert!(qc.passed());
        qc.ph = false;
        assert!(!qc.passed());
        assert!(!QcChecklist::default().passed());
    }

    #[test]
    fn create_request_rejects_non_positive_ingredient_quantity() {
        let req: CreateBatchRequest = serde_json::from_str(
            r#"{"productId":"550e8400-e29b-41d4-a716-446655440000","manufacturingDate":"2025-03-12",
                "batchSize":10,"ingredients":[{"stockLotId":"550e8400-e29b-41d4-a716-446655440001","quantity":0}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }
}
