// src/services/vendor_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::VendorRepository,
    models::vendor::{Vendor, VendorRequest},
};

#[derive(Clone)]
pub struct VendorService {
    repo: VendorRepository,
}

impl VendorService {
    pub fn new(repo: VendorRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Vendor>, AppError> {
        self.repo.list_vendors(include_inactive).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Vendor, AppError> {
        self.repo
            .get_vendor(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Fornecedor".into()))
    }

    pub async fn create<'e, E>(&self, executor: E, request: &VendorRequest) -> Result<Vendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_vendor(executor, request).await
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, request: &VendorRequest) -> Result<Vendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_vendor(executor, id, request)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Fornecedor".into()))
    }
}
