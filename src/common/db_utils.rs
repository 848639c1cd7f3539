use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper de sessão: identifica o usuário para as políticas do banco
// ---
/// Adquire uma conexão da pool e grava `app.user_id` na sessão.
/// As políticas de RLS (quando configuradas no banco) leem essa variável.
pub(crate) async fn get_session_connection(
    app_state: &AppState,
    user: &AuthenticatedUser,
) -> Result<sqlx::pool::PoolConnection<Postgres>, AppError> {
    let mut conn = app_state.db_pool.acquire().await?;

    // A conexão volta para a pool com o valor antigo; por isso sobrescrevemos a cada aquisição.
    set_session_user(&mut *conn, user.0.id, false).await?;

    Ok(conn)
}

/// `is_local = true` limita o valor à transação corrente.
pub(crate) async fn set_session_user<'e, E>(
    executor: E,
    user_id: Uuid,
    is_local: bool,
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("SELECT set_config('app.user_id', $1, $2)")
        .bind(user_id.to_string())
        .bind(is_local)
        .execute(executor)
        .await?;

    Ok(())
}
