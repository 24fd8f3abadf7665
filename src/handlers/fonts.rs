// src/handlers/fonts.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError, config::AppState, middleware::i18n::Locale, services::font_service::GoogleFont,
};

// GET /api/google-fonts
#[utoipa::path(
    get,
    path = "/api/google-fonts",
    tag = "Fonts",
    responses(
        (status = 200, description = "Catálogo (cache de 24h)", body = Vec<GoogleFont>),
        (status = 503, description = "Chave da API não configurada"),
        (status = 502, description = "Falha na API do Google")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_google_fonts(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let fonts = app_state
        .font_service
        .catalog()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(fonts.as_ref().clone()))
}
