// src/db/ingredient_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ingredient::{CreateIngredientRequest, CreateStockLotRequest, Ingredient, LotStatus, StockLot},
};

#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, AppError> {
        let ingredients = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(ingredients)
    }

    pub async fn ingredient_exists(&self, ingredient_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM ingredients WHERE id = $1)")
            .bind(ingredient_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn list_lots(&self, ingredient_id: Uuid) -> Result<Vec<StockLot>, AppError> {
        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT * FROM ingredient_stock_lots
            WHERE ingredient_id = $1
            ORDER BY expiry_date ASC NULLS LAST, received_date ASC
            "#,
        )
        .bind(ingredient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lots)
    }

    pub async fn list_all_lots(&self) -> Result<Vec<StockLot>, AppError> {
        let lots = sqlx::query_as::<_, StockLot>("SELECT * FROM ingredient_stock_lots")
            .fetch_all(&self.pool)
            .await?;
        Ok(lots)
    }

    // ---
    // Escritas
    // ---

    pub async fn create_ingredient<'e, E>(
        &self,
        executor: E,
        input: &CreateIngredientRequest,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (name, unit, reorder_level, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.reorder_level)
        .bind(&input.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    let mut errors = validator::ValidationErrors::new();
                    let mut err = validator::ValidationError::new("unique");
                    err.message = Some(format!("Já existe um insumo chamado '{}'.", input.name).into());
                    errors.add("name", err);
                    return AppError::ValidationError(errors);
                }
            }
            e.into()
        })
    }

    pub async fn create_lot<'e, E>(
        &self,
        executor: E,
        ingredient_id: Uuid,
        input: &CreateStockLotRequest,
        received_date: NaiveDate,
    ) -> Result<StockLot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O lote nasce cheio: quantity = original_quantity
        let lot = sqlx::query_as::<_, StockLot>(
            r#"
            INSERT INTO ingredient_stock_lots (
                ingredient_id, vendor_id, lot_number, quantity, original_quantity,
                unit_cost, received_date, expiry_date
            )
            VALUES ($1, $2, $3, $4, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(ingredient_id)
        .bind(input.vendor_id)
        .bind(&input.lot_number)
        .bind(input.quantity)
        .bind(input.unit_cost)
        .bind(received_date)
        .bind(input.expiry_date)
        .fetch_one(executor)
        .await?;

        Ok(lot)
    }

    pub async fn get_lot_for_update<'e, E>(
        &self,
        executor: E,
        lot_id: Uuid,
    ) -> Result<Option<StockLot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, StockLot>(
            "SELECT * FROM ingredient_stock_lots WHERE id = $1 FOR UPDATE",
        )
        .bind(lot_id)
        .fetch_optional(executor)
        .await?;

        Ok(lot)
    }

    pub async fn set_lot_quantity<'e, E>(
        &self,
        executor: E,
        lot_id: Uuid,
        quantity: Decimal,
        status: LotStatus,
    ) -> Result<StockLot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, StockLot>(
            r#"
            UPDATE ingredient_stock_lots
            SET quantity = $2, status = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(lot_id)
        .bind(quantity)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(lot)
    }
}
