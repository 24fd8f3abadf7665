// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::rbac::{can, Action, Resource},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    const ACTION: Action;
    const RESOURCE: Resource;
}

/// 2. O Extractor (Guardião). Repete no servidor a mesma decisão que a UI usa
/// para esconder os botões.
pub struct RequirePermission<T>(PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Extrai Usuário (colocado pelo auth_guard)
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        let current = user.current();

        // B. Consulta a tabela estática
        if !can(T::ACTION, T::RESOURCE, current.role) {
            tracing::info!(
                "Usuário {} ({:?}) sem permissão {}:{}",
                current.id,
                current.role,
                T::RESOURCE.slug(),
                T::ACTION.slug()
            );
            return Err(AppError::Forbidden {
                action: T::ACTION,
                resource: T::RESOURCE,
            }
            .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermAssetsCreate;
impl PermissionDef for PermAssetsCreate {
    const ACTION: Action = Action::Create;
    const RESOURCE: Resource = Resource::BrandAssets;
}

pub struct PermAssetsUpdate;
impl PermissionDef for PermAssetsUpdate {
    const ACTION: Action = Action::Update;
    const RESOURCE: Resource = Resource::BrandAssets;
}

pub struct PermAssetsDelete;
impl PermissionDef for PermAssetsDelete {
    const ACTION: Action = Action::Delete;
    const RESOURCE: Resource = Resource::BrandAssets;
}

pub struct PermPersonasCreate;
impl PermissionDef for PermPersonasCreate {
    const ACTION: Action = Action::Create;
    const RESOURCE: Resource = Resource::Personas;
}

pub struct PermPersonasUpdate;
impl PermissionDef for PermPersonasUpdate {
    const ACTION: Action = Action::Update;
    const RESOURCE: Resource = Resource::Personas;
}

pub struct PermPersonasDelete;
impl PermissionDef for PermPersonasDelete {
    const ACTION: Action = Action::Delete;
    const RESOURCE: Resource = Resource::Personas;
}

pub struct PermSectionsCreate;
impl PermissionDef for PermSectionsCreate {
    const ACTION: Action = Action::Create;
    const RESOURCE: Resource = Resource::HiddenSections;
}

pub struct PermSectionsDelete;
impl PermissionDef for PermSectionsDelete {
    const ACTION: Action = Action::Delete;
    const RESOURCE: Resource = Resource::HiddenSections;
}
