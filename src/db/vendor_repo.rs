// src/db/vendor_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::vendor::{Vendor, VendorRequest},
};

#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_vendors(&self, include_inactive: bool) -> Result<Vec<Vendor>, AppError> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT * FROM vendors WHERE ($1 OR is_active) ORDER BY name ASC",
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    pub async fn get_vendor(&self, id: Uuid) -> Result<Option<Vendor>, AppError> {
        let vendor = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vendor)
    }

    pub async fn create_vendor<'e, E>(&self, executor: E, input: &VendorRequest) -> Result<Vendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, contact_name, email, phone, category, address, notes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.category)
        .bind(&input.address)
        .bind(&input.notes)
        .bind(input.is_active)
        .fetch_one(executor)
        .await?;
        Ok(vendor)
    }

    // Desativar é só `isActive = false`; fornecedor nunca é apagado
    pub async fn update_vendor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &VendorRequest,
    ) -> Result<Option<Vendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors
            SET name = $2, contact_name = $3, email = $4, phone = $5, category = $6,
                address = $7, notes = $8, is_active = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.category)
        .bind(&input.address)
        .bind(&input.notes)
        .bind(input.is_active)
        .fetch_optional(executor)
        .await?;
        Ok(vendor)
    }
}
