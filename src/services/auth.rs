// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Profile},
};

// Login e emissão de tokens ficam no serviço de autenticação externo;
// aqui só validamos a assinatura e carregamos o perfil.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

/// Verifica assinatura (HS256) e expiração, devolvendo as claims.
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

    Ok(token_data.claims)
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let claims = decode_claims(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.user_repo.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use super::*;

    const SECRET: &str = "segredo-de-teste";

    fn token(secret: &str, expires_in: Duration) -> (Uuid, String) {
        let sub = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            sub,
            exp: (now + expires_in).timestamp() as usize,
            iat: now.timestamp() as usize,
            email: Some("socia@atelier.com".into()),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap();
        (sub, token)
    }

    #[test]
    fn accepts_a_valid_token() {
        let (sub, token) = token(SECRET, Duration::hours(1));
        let claims = decode_claims(&token, SECRET).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email.as_deref(), Some("socia@atelier.com"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let (_, token) = token("outro-segredo", Duration::hours(1));
        assert!(matches!(decode_claims(&token, SECRET), Err(AppError::InvalidToken)));
    }

    #[test]
    fn rejects_expired_token() {
        let (_, token) = token(SECRET, -Duration::hours(2));
        assert!(matches!(decode_claims(&token, SECRET), Err(AppError::InvalidToken)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_claims("nao.e.jwt", SECRET), Err(AppError::InvalidToken)));
    }
}
