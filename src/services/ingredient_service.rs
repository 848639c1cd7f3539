// src/services/ingredient_service.rs

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::IngredientRepository,
    models::ingredient::{
        CreateIngredientRequest, CreateStockLotRequest, Ingredient, IngredientStock, LotStatus, StockLot,
    },
};

/// Janela (em dias) para um insumo entrar em "vence em breve".
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Consolida os lotes por insumo. Só lotes `available` contam para o total e para a validade.
pub fn summarize_stock(ingredients: Vec<Ingredient>, lots: &[StockLot], today: NaiveDate) -> Vec<IngredientStock> {
    let mut by_ingredient: HashMap<Uuid, (Decimal, Option<NaiveDate>)> = HashMap::new();

    for lot in lots.iter().filter(|l| l.status == LotStatus::Available) {
        let entry = by_ingredient.entry(lot.ingredient_id).or_insert((Decimal::ZERO, None));
        entry.0 += lot.quantity;
        entry.1 = match (entry.1, lot.expiry_date) {
            (Some(current), Some(candidate)) => Some(current.min(candidate)),
            (current, candidate) => current.or(candidate),
        };
    }

    let horizon = today + Duration::days(EXPIRING_WINDOW_DAYS);

    ingredients
        .into_iter()
        .map(|ingredient| {
            let (total_stock, earliest_expiry) =
                by_ingredient.get(&ingredient.id).copied().unwrap_or((Decimal::ZERO, None));

            IngredientStock {
                low_stock: total_stock < ingredient.reorder_level,
                expiring_soon: earliest_expiry.is_some_and(|d| d <= horizon),
                ingredient,
                total_stock,
                earliest_expiry,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct IngredientService {
    repo: IngredientRepository,
}

impl IngredientService {
    pub fn new(repo: IngredientRepository) -> Self {
        Self { repo }
    }

    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, AppError> {
        self.repo.list_ingredients().await
    }

    pub async fn create_ingredient<'e, E>(
        &self,
        executor: E,
        request: &CreateIngredientRequest,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_ingredient(executor, request).await
    }

    pub async fn list_lots(&self, ingredient_id: Uuid) -> Result<Vec<StockLot>, AppError> {
        if !self.repo.ingredient_exists(ingredient_id).await? {
            return Err(AppError::ResourceNotFound("Insumo".into()));
        }
        self.repo.list_lots(ingredient_id).await
    }

    pub async fn add_lot<'e, E>(
        &self,
        executor: E,
        ingredient_id: Uuid,
        request: &CreateStockLotRequest,
    ) -> Result<StockLot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.ingredient_exists(ingredient_id).await? {
            return Err(AppError::ResourceNotFound("Insumo".into()));
        }

        let received_date = request.received_date.unwrap_or_else(|| Utc::now().date_naive());
        self.repo
            .create_lot(executor, ingredient_id, request, received_date)
            .await
    }

    /// Baixa manual de um lote (perda, amostra, uso fora de lote de produção).
    pub async fn consume_lot<'e, E>(
        &self,
        executor: E,
        lot_id: Uuid,
        quantity: Decimal,
    ) -> Result<StockLot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let lot = self
            .repo
            .get_lot_for_update(&mut *tx, lot_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote de insumo".into()))?;

        let remaining = lot.quantity - quantity;
        if remaining.is_sign_negative() || remaining > lot.original_quantity {
            return Err(AppError::LotQuantityOutOfRange);
        }

        let status = if remaining.is_zero() { LotStatus::Depleted } else { lot.status };
        let updated = self.repo.set_lot_quantity(&mut *tx, lot_id, remaining, status).await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn stock_overview(&self) -> Result<Vec<IngredientStock>, AppError> {
        let ingredients = self.repo.list_ingredients().await?;
        let lots = self.repo.list_all_lots().await?;
        Ok(summarize_stock(ingredients, &lots, Utc::now().date_naive()))
    }

    pub async fn alerts(&self) -> Result<Vec<IngredientStock>, AppError> {
        Ok(self
            .stock_overview()
            .await?
            .into_iter()
            .filter(IngredientStock::needs_attention)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn ingredient(name: &str, reorder_level: i64) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: name.into(),
            unit: "kg".into(),
            reorder_level: Decimal::new(reorder_level, 0),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn lot(ingredient_id: Uuid, quantity: i64, expiry_in: Option<i64>, status: LotStatus) -> StockLot {
        StockLot {
            id: Uuid::new_v4(),
            ingredient_id,
            vendor_id: None,
            lot_number: None,
            quantity: Decimal::new(quantity, 0),
            original_quantity: Decimal::new(quantity, 0),
            unit_cost: None,
            received_date: today(),
            expiry_date: expiry_in.map(|d| today() + Duration::days(d)),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn totals_only_count_available_lots() {
        let glycerin = ingredient("Glicerina", 5);
        let lots = vec![
            lot(glycerin.id, 3, Some(200), LotStatus::Available),
            lot(glycerin.id, 4, Some(100), LotStatus::Available),
            lot(glycerin.id, 50, Some(5), LotStatus::Quarantined),
        ];

        let summary = summarize_stock(vec![glycerin], &lots, today());

        assert_eq!(summary[0].total_stock, Decimal::new(7, 0));
        assert_eq!(summary[0].earliest_expiry, Some(today() + Duration::days(100)));
        assert!(!summary[0].low_stock);
        assert!(!summary[0].expiring_soon);
        assert!(!summary[0].needs_attention());
    }

    #[test]
    fn flags_low_stock_and_expiring_lots() {
        let butter = ingredient("Manteiga de Karité", 10);
        let oil = ingredient("Óleo de Rosa Mosqueta", 1);
        let lots = vec![
            lot(butter.id, 2, None, LotStatus::Available),
            lot(oil.id, 3, Some(30), LotStatus::Available),
        ];

        let summary = summarize_stock(vec![butter, oil], &lots, today());

        assert!(summary[0].low_stock);
        assert_eq!(summary[0].earliest_expiry, None);
        assert!(!summary[0].expiring_soon);

        assert!(!summary[1].low_stock);
        assert!(summary[1].expiring_soon);
    }

    #[test]
    fn ingredient_without_lots_has_zero_stock() {
        let summary = summarize_stock(vec![ingredient("Ureia", 1)], &[], today());
        assert_eq!(summary[0].total_stock, Decimal::ZERO);
        assert!(summary[0].low_stock);
    }
}
