// src/db/batch_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::batch::{Batch, BatchStatus, QcChecklist, TracedLot},
};

// Dados do produto de que o lote precisa
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BatchProductInfo {
    pub name: String,
    pub shelf_life_months: i32,
}

#[derive(Clone)]
pub struct BatchRepository {
    pool: PgPool,
}

impl BatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras (pool principal)
    // ---

    pub async fn list_batches(&self, product_id: Option<Uuid>) -> Result<Vec<Batch>, AppError> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT * FROM batches
            WHERE ($1::uuid IS NULL OR product_id = $1)
            ORDER BY manufacturing_date DESC, batch_number DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    pub async fn get_batch(&self, batch_id: Uuid) -> Result<Option<Batch>, AppError> {
        let batch = sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = $1")
            .bind(batch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(batch)
    }

    pub async fn list_traced_lots(&self, batch_id: Uuid) -> Result<Vec<TracedLot>, AppError> {
        let lots = sqlx::query_as::<_, TracedLot>(
            r#"
            SELECT
                l.id AS stock_lot_id,
                i.id AS ingredient_id,
                i.name AS ingredient_name,
                l.lot_number,
                v.id AS vendor_id,
                v.name AS vendor_name,
                bi.quantity,
                l.expiry_date
            FROM batch_ingredients bi
            JOIN ingredient_stock_lots l ON bi.stock_lot_id = l.id
            JOIN ingredients i ON l.ingredient_id = i.id
            LEFT JOIN vendors v ON l.vendor_id = v.id
            WHERE bi.batch_id = $1
            ORDER BY i.name ASC
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lots)
    }

    pub async fn get_product_name(&self, product_id: Uuid) -> Result<Option<String>, AppError> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(name)
    }

    // ---
    // Escritas (executor genérico, normalmente uma transação)
    // ---

    pub async fn find_product_info<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Option<BatchProductInfo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let info = sqlx::query_as::<_, BatchProductInfo>(
            "SELECT name, shelf_life_months FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(executor)
        .await?;

        Ok(info)
    }

    pub async fn count_batches_on<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        manufacturing_date: NaiveDate,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM batches WHERE product_id = $1 AND manufacturing_date = $2",
        )
        .bind(product_id)
        .bind(manufacturing_date)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_batch<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        batch_number: &str,
        manufacturing_date: NaiveDate,
        expiry_date: NaiveDate,
        batch_size: i32,
        units_in_stock: i32,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, Batch>(
            r#"
            INSERT INTO batches (
                product_id, batch_number, manufacturing_date, expiry_date,
                batch_size, units_in_stock, qc_checklist, status, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'quarantine', $8, $9)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(batch_number)
        .bind(manufacturing_date)
        .bind(expiry_date)
        .bind(batch_size)
        .bind(units_in_stock)
        .bind(Json(QcChecklist::default()))
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(batch)
    }

    pub async fn link_ingredient<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        stock_lot_id: Uuid,
        quantity: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO batch_ingredients (batch_id, stock_lot_id, quantity) VALUES ($1, $2, $3)",
        )
        .bind(batch_id)
        .bind(stock_lot_id)
        .bind(quantity)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn get_batch_for_update<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
    ) -> Result<Option<Batch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = $1 FOR UPDATE")
            .bind(batch_id)
            .fetch_optional(executor)
            .await?;

        Ok(batch)
    }

    pub async fn update_units<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        units_in_stock: i32,
        status: BatchStatus,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, Batch>(
            r#"
            UPDATE batches
            SET units_in_stock = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(batch_id)
        .bind(units_in_stock)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(batch)
    }

    pub async fn update_qc<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        checklist: &QcChecklist,
    ) -> Result<Option<Batch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, Batch>(
            r#"
            UPDATE batches
            SET qc_checklist = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(batch_id)
        .bind(Json(checklist))
        .fetch_optional(executor)
        .await?;

        Ok(batch)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        status: BatchStatus,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, Batch>(
            "UPDATE batches SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(batch_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(batch)
    }
}
