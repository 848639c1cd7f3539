// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Despesa aprovada")]
    pub title: String,
    pub message: String,
    #[schema(example = "expense_review")]
    pub kind: String,
    #[schema(example = "/expenses")]
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// Dados para gravar uma notificação (usado internamente pelos serviços)
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: &'static str,
    pub link: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}
