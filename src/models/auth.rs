// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Partner,
}

// Perfil do usuário. A conta (senha, login) vive no serviço de autenticação externo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    #[schema(example = "socia@atelier.com")]
    pub email: String,
    #[schema(example = "Ana Souza")]
    pub full_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo serviço de auth
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    #[serde(default)]
    pub iat: usize, // Issued At (quando o token foi criado)
    #[serde(default)]
    pub email: Option<String>,
}
