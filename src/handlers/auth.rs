// src/handlers/auth.rs

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    middleware::auth::AuthenticatedUser,
    models::{
        auth::User,
        rbac::{capabilities, Capability},
    },
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    /// O que o papel permite; a UI esconde o resto.
    pub capabilities: Vec<Capability>,
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário atual e suas capacidades", body = MeResponse),
        (status = 401, description = "Token inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<MeResponse> {
    let capabilities = capabilities(user.role);
    Json(MeResponse { user, capabilities })
}
