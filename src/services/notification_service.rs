// src/services/notification_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificationRepository,
    models::notification::{Notification, UnreadCount},
};

// Quantas notificações a listagem devolve
const LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_user(user_id, LIST_LIMIT).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<UnreadCount, AppError> {
        let unread = self.repo.unread_count(user_id).await?;
        Ok(UnreadCount { unread })
    }

    pub async fn mark_read<'e, E>(&self, executor: E, user_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.mark_read(executor, user_id, id).await? {
            return Err(AppError::ResourceNotFound("Notificação".into()));
        }
        Ok(())
    }

    pub async fn mark_all_read<'e, E>(&self, executor: E, user_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.mark_all_read(executor, user_id).await
    }
}
