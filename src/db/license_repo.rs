// src/db/license_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::license::{License, LicenseRequest},
};

#[derive(Clone)]
pub struct LicenseRepository {
    pool: PgPool,
}

impl LicenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_licenses(&self) -> Result<Vec<License>, AppError> {
        let licenses = sqlx::query_as::<_, License>(
            "SELECT * FROM licenses ORDER BY expiry_date ASC NULLS LAST, license_type ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(licenses)
    }

    pub async fn get_license(&self, id: Uuid) -> Result<Option<License>, AppError> {
        let license = sqlx::query_as::<_, License>("SELECT * FROM licenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(license)
    }

    pub async fn create_license<'e, E>(
        &self,
        executor: E,
        input: &LicenseRequest,
    ) -> Result<License, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let license = sqlx::query_as::<_, License>(
            r#"
            INSERT INTO licenses (
                license_type, number, issuing_authority, issue_date, expiry_date, document_url, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.license_type)
        .bind(&input.number)
        .bind(&input.issuing_authority)
        .bind(input.issue_date)
        .bind(input.expiry_date)
        .bind(&input.document_url)
        .bind(&input.notes)
        .fetch_one(executor)
        .await?;
        Ok(license)
    }

    pub async fn update_license<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &LicenseRequest,
    ) -> Result<Option<License>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let license = sqlx::query_as::<_, License>(
            r#"
            UPDATE licenses
            SET license_type = $2, number = $3, issuing_authority = $4, issue_date = $5,
                expiry_date = $6, document_url = $7, notes = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.license_type)
        .bind(&input.number)
        .bind(&input.issuing_authority)
        .bind(input.issue_date)
        .bind(input.expiry_date)
        .bind(&input.document_url)
        .bind(&input.notes)
        .fetch_optional(executor)
        .await?;
        Ok(license)
    }
}
