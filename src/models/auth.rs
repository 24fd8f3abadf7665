// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::rbac::{Action, Resource};

// Mapeia o CREATE TYPE user_role do banco.
// A ordem das variantes é a ordem de privilégio (GUEST < ... < SUPER_ADMIN).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Guest,
    Standard,
    Editor,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Guest,
        UserRole::Standard,
        UserRole::Editor,
        UserRole::Admin,
        UserRole::SuperAdmin,
    ];

    /// STANDARD e GUEST nunca escrevem nada.
    pub fn is_read_only(self) -> bool {
        self < UserRole::Editor
    }
}

// Representa um usuário vindo do banco de dados (espelho do serviço de autenticação)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "ana@agencia.com")]
    pub email: String,
    #[schema(example = "Ana Souza")]
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn current(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            role: self.role,
        }
    }
}

/// Contexto explícito do usuário atual.
/// Toda decisão de visibilidade/edição recebe este valor como argumento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn can(&self, action: Action, resource: Resource) -> bool {
        crate::models::rbac::can(action, resource, self.role)
    }
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo serviço de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(UserRole::Guest < UserRole::Standard);
        assert!(UserRole::Standard < UserRole::Editor);
        assert!(UserRole::Editor < UserRole::Admin);
        assert!(UserRole::Admin < UserRole::SuperAdmin);
    }

    #[test]
    fn only_guest_and_standard_are_read_only() {
        let read_only: Vec<UserRole> = UserRole::ALL
            .into_iter()
            .filter(|r| r.is_read_only())
            .collect();
        assert_eq!(read_only, vec![UserRole::Guest, UserRole::Standard]);
    }

    #[test]
    fn role_serializes_in_screaming_snake_case() {
        let json = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }
}
