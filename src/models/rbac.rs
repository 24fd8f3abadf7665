// src/models/rbac.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::auth::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    BrandAssets,
    Personas,
    HiddenSections,
    Fonts,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn slug(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::BrandAssets,
        Resource::Personas,
        Resource::HiddenSections,
        Resource::Fonts,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Resource::BrandAssets => "brand_assets",
            Resource::Personas => "personas",
            Resource::HiddenSections => "hidden_sections",
            Resource::Fonts => "fonts",
        }
    }
}

// ---
// Tabela estática de capacidades: (papel mínimo, recurso, ações)
// ---
// A linha vale para o papel informado e todos os papéis acima dele.
const CAPABILITIES: &[(UserRole, Resource, &[Action])] = &[
    (UserRole::Guest, Resource::BrandAssets, &[Action::Read]),
    (UserRole::Guest, Resource::Personas, &[Action::Read]),
    (UserRole::Guest, Resource::HiddenSections, &[Action::Read]),
    (UserRole::Guest, Resource::Fonts, &[Action::Read]),
    (
        UserRole::Editor,
        Resource::BrandAssets,
        &[Action::Create, Action::Update, Action::Delete],
    ),
    (
        UserRole::Editor,
        Resource::Personas,
        &[Action::Create, Action::Update, Action::Delete],
    ),
    (
        UserRole::Admin,
        Resource::HiddenSections,
        &[Action::Create, Action::Update, Action::Delete],
    ),
];

/// O "portão" de permissões: função pura de (ação, recurso, papel).
/// Serve para a UI decidir o que renderizar; as rotas verificam de novo via `RequirePermission`.
pub fn can(action: Action, resource: Resource, role: UserRole) -> bool {
    CAPABILITIES
        .iter()
        .any(|(min_role, res, actions)| role >= *min_role && *res == resource && actions.contains(&action))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub resource: Resource,
    pub actions: Vec<Action>,
}

/// Matriz completa de capacidades de um papel, na ordem de `Resource::ALL`.
pub fn capabilities(role: UserRole) -> Vec<Capability> {
    Resource::ALL
        .into_iter()
        .map(|resource| Capability {
            resource,
            actions: Action::ALL
                .into_iter()
                .filter(|a| can(*a, resource, role))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_cannot_create_brand_assets() {
        assert!(!can(Action::Create, Resource::BrandAssets, UserRole::Standard));
        assert!(!can(Action::Create, Resource::BrandAssets, UserRole::Guest));
    }

    #[test]
    fn editor_can_create_brand_assets() {
        assert!(can(Action::Create, Resource::BrandAssets, UserRole::Editor));
        assert!(can(Action::Update, Resource::Personas, UserRole::Editor));
    }

    #[test]
    fn only_admins_toggle_hidden_sections() {
        assert!(can(Action::Delete, Resource::HiddenSections, UserRole::Admin));
        assert!(can(Action::Delete, Resource::HiddenSections, UserRole::SuperAdmin));
        assert!(!can(Action::Delete, Resource::HiddenSections, UserRole::Editor));
        assert!(!can(Action::Create, Resource::HiddenSections, UserRole::Editor));
    }

    #[test]
    fn everyone_reads_everything() {
        for role in UserRole::ALL {
            for resource in Resource::ALL {
                assert!(can(Action::Read, resource, role), "{role:?} {resource:?}");
            }
        }
    }

    #[test]
    fn read_only_roles_get_read_only_matrix() {
        for role in [UserRole::Guest, UserRole::Standard] {
            for cap in capabilities(role) {
                assert_eq!(cap.actions, vec![Action::Read]);
            }
        }
    }

    #[test]
    fn capabilities_are_monotonic_in_role() {
        for pair in UserRole::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            for resource in Resource::ALL {
                for action in Action::ALL {
                    if can(action, resource, lower) {
                        assert!(can(action, resource, higher));
                    }
                }
            }
        }
    }
}
