// src/handlers/personas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::PersonaFields,
    middleware::{
        i18n::Locale,
        rbac::{PermPersonasCreate, PermPersonasDelete, PermPersonasUpdate, RequirePermission},
    },
    models::persona::{PersonaMetrics, UserPersona},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório"))]
    #[schema(example = "Marina, a organizadora")]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    #[schema(example = "25-34")]
    pub age_range: String,
    #[serde(default)]
    pub event_attributes: Vec<String>,
    #[serde(default)]
    pub motivations: Vec<String>,
    #[serde(default)]
    pub core_needs: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    pub metrics: Option<PersonaMetrics>,
    #[validate(url(message = "imageUrl deve ser uma URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonaPayload {
    #[validate(length(min = 1, max = 120, message = "O nome não pode ficar vazio"))]
    pub name: Option<String>,
    pub role: Option<String>,
    pub age_range: Option<String>,
    pub event_attributes: Option<Vec<String>>,
    pub motivations: Option<Vec<String>>,
    pub core_needs: Option<Vec<String>>,
    pub pain_points: Option<Vec<String>>,
    pub metrics: Option<PersonaMetrics>,
    #[validate(url(message = "imageUrl deve ser uma URL"))]
    pub image_url: Option<String>,
}

impl CreatePersonaPayload {
    fn fields(&self) -> PersonaFields<'_> {
        let metrics = self.metrics.clone().unwrap_or_default();
        PersonaFields {
            name: Some(self.name.as_str()),
            role: Some(self.role.as_str()),
            age_range: Some(self.age_range.as_str()),
            event_attributes: Some(self.event_attributes.as_slice()),
            motivations: Some(self.motivations.as_slice()),
            core_needs: Some(self.core_needs.as_slice()),
            pain_points: Some(self.pain_points.as_slice()),
            average_spend: metrics.average_spend,
            event_attendance: metrics.event_attendance,
            engagement_rate: metrics.engagement_rate,
            image_url: self.image_url.as_deref(),
        }
    }
}

impl UpdatePersonaPayload {
    fn fields(&self) -> PersonaFields<'_> {
        let metrics = self.metrics.clone().unwrap_or_default();
        PersonaFields {
            name: self.name.as_deref(),
            role: self.role.as_deref(),
            age_range: self.age_range.as_deref(),
            event_attributes: self.event_attributes.as_deref(),
            motivations: self.motivations.as_deref(),
            core_needs: self.core_needs.as_deref(),
            pain_points: self.pain_points.as_deref(),
            average_spend: metrics.average_spend,
            event_attendance: metrics.event_attendance,
            engagement_rate: metrics.engagement_rate,
            image_url: self.image_url.as_deref(),
        }
    }
}

// GET /api/clients/{clientId}/personas
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/personas",
    tag = "Personas",
    params(("clientId" = i32, Path)),
    responses((status = 200, body = Vec<UserPersona>)),
    security(("api_jwt" = []))
)]
pub async fn list_personas(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(client_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let personas = app_state
        .persona_service
        .list(&app_state.db_pool, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(personas))
}

// GET /api/clients/{clientId}/personas/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{clientId}/personas/{id}",
    tag = "Personas",
    params(("clientId" = i32, Path), ("id" = i32, Path)),
    responses((status = 200, body = UserPersona), (status = 404, description = "Persona não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_persona(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((client_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    let persona = app_state
        .persona_service
        .get(&app_state.db_pool, client_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(persona))
}

// POST /api/clients/{clientId}/personas
#[utoipa::path(
    post,
    path = "/api/clients/{clientId}/personas",
    tag = "Personas",
    params(("clientId" = i32, Path)),
    request_body = CreatePersonaPayload,
    responses((status = 201, body = UserPersona), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_persona(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPersonasCreate>,
    Path(client_id): Path<i32>,
    Json(payload): Json<CreatePersonaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let persona = app_state
        .persona_service
        .create(&app_state.db_pool, client_id, &payload.fields())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(persona)))
}

// PATCH /api/clients/{clientId}/personas/{id}
#[utoipa::path(
    patch,
    path = "/api/clients/{clientId}/personas/{id}",
    tag = "Personas",
    params(("clientId" = i32, Path), ("id" = i32, Path)),
    request_body = UpdatePersonaPayload,
    responses((status = 200, body = UserPersona), (status = 404, description = "Persona não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn update_persona(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPersonasUpdate>,
    Path((client_id, id)): Path<(i32, i32)>,
    Json(payload): Json<UpdatePersonaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let persona = app_state
        .persona_service
        .update(&app_state.db_pool, client_id, id, &payload.fields())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(persona))
}

// DELETE /api/clients/{clientId}/personas/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{clientId}/personas/{id}",
    tag = "Personas",
    params(("clientId" = i32, Path), ("id" = i32, Path)),
    responses((status = 204, description = "Removida"), (status = 404, description = "Persona não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn delete_persona(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPersonasDelete>,
    Path((client_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .persona_service
        .delete(&app_state.db_pool, client_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_defaults_lists_and_rejects_blank_name() {
        let payload: CreatePersonaPayload = serde_json::from_value(json!({ "name": "" })).unwrap();
        assert!(payload.validate().is_err());

        let payload: CreatePersonaPayload = serde_json::from_value(json!({
            "name": "Marina",
            "metrics": { "eventAttendance": 4 }
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        let fields = payload.fields();
        assert_eq!(fields.motivations, Some(&[][..]));
        assert_eq!(fields.event_attendance, Some(4));
        assert_eq!(fields.average_spend, None);
    }

    #[test]
    fn update_keeps_absent_fields_untouched() {
        let payload: UpdatePersonaPayload = serde_json::from_value(json!({ "role": "Produtora" })).unwrap();
        let fields = payload.fields();
        assert_eq!(fields.role, Some("Produtora"));
        assert_eq!(fields.name, None);
        assert_eq!(fields.pain_points, None);
    }

    #[test]
    fn image_url_must_be_a_url() {
        let payload: UpdatePersonaPayload =
            serde_json::from_value(json!({ "imageUrl": "nao e url" })).unwrap();
        assert!(payload.validate().is_err());
    }
}
