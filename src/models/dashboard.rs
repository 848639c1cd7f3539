// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::product::Stage;

// Quantidade de produtos por etapa (uma entrada por etapa do catálogo)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: Stage,
    pub total: i64,
}

// Os cards do topo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub products_by_stage: Vec<StageCount>,
    pub active_products: i64,        // Ainda não lançados
    pub batches_in_quarantine: i64,  // Aguardando controle de qualidade
    pub license_alerts: i64,         // Vencidas ou a vencer em até 90 dias
    pub low_stock_ingredients: i64,
    pub expenses_this_month: Decimal, // Apenas aprovadas
}
