// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O trait que define um papel exigido pela rota
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
    fn slug() -> &'static str;
}

/// 2. O extrator (guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.0.role != T::role() {
            let app_state = AppState::from_ref(state);
            let locale = Locale::from_headers(&parts.headers);
            return Err(AppError::Forbidden(T::slug()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// PAPÉIS
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn role() -> UserRole {
        UserRole::Admin
    }
    fn slug() -> &'static str {
        "admin"
    }
}
