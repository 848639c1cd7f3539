// src/db/product_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::set_session_user, error::AppError},
    models::product::{NewProduct, Product, Stage, StageHistoryEntry, StageTransition, UpdateProductRequest},
};

/// Acesso tipado a produtos e ao histórico de etapas.
///
/// O motor de etapas depende só deste trait, o que permite testá-lo sem banco.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, AppError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Grava o produto e abre o primeiro intervalo do histórico.
    async fn create_product(&self, product: NewProduct) -> Result<Product, AppError>;

    /// Edição de cadastro. Nunca altera a etapa.
    async fn update_product(
        &self,
        id: Uuid,
        changes: &UpdateProductRequest,
    ) -> Result<Option<Product>, AppError>;

    /// Fecha o intervalo aberto, move o ponteiro de etapa e abre o novo intervalo,
    /// tudo ou nada. Falha com `StageConflict` se a etapa atual não for mais `transition.from`.
    async fn apply_transition(&self, transition: &StageTransition) -> Result<Product, AppError>;

    async fn stage_history(&self, product_id: Uuid) -> Result<Vec<StageHistoryEntry>, AppError>;
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products ORDER BY stage_entered_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;
        set_session_user(&mut *tx, new.created_by, true).await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, category, product_type, description, image_url, priority, progress,
                current_stage, stage_entered_at, assigned_partners, shelf_life_months,
                created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $9, $9)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.category)
        .bind(&new.product_type)
        .bind(&new.description)
        .bind(&new.image_url)
        .bind(new.priority)
        .bind(new.progress)
        .bind(new.stage)
        .bind(new.created_at)
        .bind(&new.assigned_partners)
        .bind(new.shelf_life_months)
        .bind(new.created_by)
        .fetch_one(&mut *tx)
        .await?;

        // Todo produto nasce com exatamente um intervalo aberto
        sqlx::query(
            r#"
            INSERT INTO product_stage_history (product_id, stage, entered_at, actor_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id)
        .bind(product.current_stage)
        .bind(product.stage_entered_at)
        .bind(new.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: &UpdateProductRequest,
    ) -> Result<Option<Product>, AppError> {
        let partners = crate::models::product::dedup_partners(&changes.assigned_partners);

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, category = $3, product_type = $4, description = $5,
                image_url = $6, priority = $7, progress = $8, assigned_partners = $9,
                shelf_life_months = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.category)
        .bind(&changes.product_type)
        .bind(&changes.description)
        .bind(&changes.image_url)
        .bind(changes.priority)
        .bind(changes.progress)
        .bind(&partners)
        .bind(changes.shelf_life_months)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn apply_transition(&self, t: &StageTransition) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;
        set_session_user(&mut *tx, t.actor_id, true).await?;

        // 1. Trava a linha do produto: duas movimentações simultâneas não se cruzam
        let current = sqlx::query_scalar::<_, Stage>(
            "SELECT current_stage FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(t.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;

        if current != t.from {
            return Err(AppError::StageConflict);
        }

        // 2. Fecha o intervalo aberto
        sqlx::query(
            r#"
            UPDATE product_stage_history
            SET exited_at = $2
            WHERE product_id = $1 AND exited_at IS NULL
            "#,
        )
        .bind(t.product_id)
        .bind(t.at)
        .execute(&mut *tx)
        .await?;

        // 3. Move o ponteiro de etapa (progresso só muda ao entrar na etapa terminal)
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET current_stage = $2,
                stage_entered_at = $3,
                progress = COALESCE($4, progress),
                updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(t.product_id)
        .bind(t.to)
        .bind(t.at)
        .bind(t.progress)
        .fetch_one(&mut *tx)
        .await?;

        // 4. Abre o novo intervalo
        sqlx::query(
            r#"
            INSERT INTO product_stage_history (product_id, stage, entered_at, actor_id, notes)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(t.product_id)
        .bind(t.to)
        .bind(t.at)
        .bind(t.actor_id)
        .bind(&t.notes)
        .execute(&mut *tx)
        .await?;

        // Se qualquer passo falhar, o drop do `tx` desfaz tudo
        tx.commit().await?;

        Ok(product)
    }

    async fn stage_history(&self, product_id: Uuid) -> Result<Vec<StageHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, StageHistoryEntry>(
            r#"
            SELECT id, product_id, stage, entered_at, exited_at, actor_id, notes
            FROM product_stage_history
            WHERE product_id = $1
            ORDER BY entered_at ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
