// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

// Os tokens são emitidos pelo serviço de autenticação; aqui só validamos.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    /// Valida assinatura e expiração. Qualquer falha vira `InvalidToken`.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        Ok(token_data.claims)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;

        // O papel vem sempre do banco, nunca do token
        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}
