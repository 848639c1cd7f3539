// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notification::{NewNotification, Notification},
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // Executor genérico: a notificação entra na mesma transação da ação que a gerou
    pub async fn insert<'e, E>(&self, executor: E, new: &NewNotification) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, title, message, kind, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.kind)
        .bind(&new.link)
        .fetch_one(executor)
        .await?;
        Ok(notification)
    }

    /// Retorna `false` quando a notificação não existe ou é de outro usuário.
    pub async fn mark_read<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read<'e, E>(&self, executor: E, user_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
