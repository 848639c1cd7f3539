use sqlx::PgPool;
use uuid::Uuid;
use crate::{common::error::AppError, models::auth::Profile};

// O repositório de perfis, responsável pelas leituras da tabela 'profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um perfil pelo seu ID (o `sub` do token)
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, email, full_name, role, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    // Lista todos os perfis (usado para atribuir sócios aos produtos)
    pub async fn list_all(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, email, full_name, role, created_at FROM profiles ORDER BY full_name NULLS LAST, email",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
