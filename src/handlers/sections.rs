// src/handlers/sections.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermSectionsCreate, PermSectionsDelete, RequirePermission},
    },
    models::{
        asset::LogoType,
        section::{HiddenSection, HideSectionPayload},
    },
};

// GET /api/clients/{clientId}/hidden-sections
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/hidden-sections",
    tag = "Sections",
    params(("clientId" = i32, Path)),
    responses((status = 200, description = "Seções ocultas do cliente", body = Vec<HiddenSection>)),
    security(("api_jwt" = []))
)]
pub async fn list_hidden_sections(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(client_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let sections = app_state
        .section_service
        .list_hidden(client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sections))
}

// POST /api/clients/{clientId}/hidden-sections
#[utoipa::path(
    post,
    path = "/api/clients/{clientId}/hidden-sections",
    tag = "Sections",
    params(("clientId" = i32, Path)),
    request_body = HideSectionPayload,
    responses(
        (status = 201, description = "Seção ocultada", body = HiddenSection),
        (status = 403, description = "Só ADMIN ou superior")
    ),
    security(("api_jwt" = []))
)]
pub async fn hide_section(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSectionsCreate>,
    Path(client_id): Path<i32>,
    Json(payload): Json<HideSectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let section = app_state
        .section_service
        .set_visibility(client_id, payload.section_type, true)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(section)))
}

// DELETE /api/clients/{clientId}/hidden-sections/{sectionType}
#[utoipa::path(
    delete,
    path = "/api/clients/{clientId}/hidden-sections/{sectionType}",
    tag = "Sections",
    params(("clientId" = i32, Path), ("sectionType" = LogoType, Path)),
    responses(
        (status = 200, description = "Seção visível de novo", body = HiddenSection),
        (status = 403, description = "Só ADMIN ou superior")
    ),
    security(("api_jwt" = []))
)]
pub async fn show_section(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSectionsDelete>,
    Path((client_id, section_type)): Path<(i32, LogoType)>,
) -> Result<impl IntoResponse, ApiError> {
    let section = app_state
        .section_service
        .set_visibility(client_id, section_type, false)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(section))
}
