// src/handlers/colors.rs
//
// Endpoints de derivação de cor. Sem estado: só chamam as funções puras.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    services::color::{
        analyze_brightness, generate_container_colors, generate_grey_shades, generate_tints_and_shades, hex_to_cmyk,
        hex_to_hsl, hex_to_rgb, ColorError, ContainerColors, GreyShade, Rgb, TintsAndShades, DEFAULT_SHADES,
        DEFAULT_TINTS, HEX_COLOR_REGEX,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeriveColorPayload {
    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Use #rrggbb"))]
    #[schema(example = "#1a73e8")]
    pub hex: String,
    pub tint_percents: Option<Vec<u8>>,
    pub shade_percents: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DerivedColor {
    pub hex: String,
    pub rgb: String,
    pub hsl: String,
    pub cmyk: String,
    pub brightness: u8,
    #[serde(flatten)]
    pub ramps: TintsAndShades,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NeutralRampPayload {
    /// Cinzas já existentes na paleta (`#rrggbb`); seus níveis não são gerados de novo.
    #[serde(default)]
    pub existing: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPayload {
    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Use #rrggbb"))]
    pub hex: String,
}

pub fn derive(payload: &DeriveColorPayload) -> Result<DerivedColor, AppError> {
    let tints = payload.tint_percents.as_deref().unwrap_or(&DEFAULT_TINTS);
    let shades = payload.shade_percents.as_deref().unwrap_or(&DEFAULT_SHADES);
    let ramps = generate_tints_and_shades(&payload.hex, tints, shades)?;

    // O hex já passou no parse acima
    let parsed = |s: Option<String>| s.unwrap_or_default();
    Ok(DerivedColor {
        hex: Rgb::parse(&payload.hex).map(Rgb::to_hex).unwrap_or_default(),
        rgb: parsed(hex_to_rgb(&payload.hex)),
        hsl: parsed(hex_to_hsl(&payload.hex)),
        cmyk: parsed(hex_to_cmyk(&payload.hex)),
        brightness: analyze_brightness(&payload.hex),
        ramps,
    })
}

/// Níveis de brilho já ocupados. Hex inválido é erro, não nível 6.
pub fn existing_levels(existing: &[String]) -> Result<Vec<u8>, ColorError> {
    existing
        .iter()
        .map(|hex| {
            if HEX_COLOR_REGEX.is_match(hex) {
                Ok(analyze_brightness(hex))
            } else {
                Err(ColorError::InvalidHex(hex.clone()))
            }
        })
        .collect()
}

// POST /api/colors/derive
#[utoipa::path(
    post,
    path = "/api/colors/derive",
    tag = "Colors",
    request_body = DeriveColorPayload,
    responses((status = 200, body = DerivedColor), (status = 400, description = "Hex ou percentual inválido")),
    security(("api_jwt" = []))
)]
pub async fn derive_color(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<DeriveColorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let derived = derive(&payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(derived))
}

// POST /api/colors/neutral-ramp
#[utoipa::path(
    post,
    path = "/api/colors/neutral-ramp",
    tag = "Colors",
    request_body = NeutralRampPayload,
    responses(
        (status = 200, description = "Níveis de cinza que faltam", body = Vec<GreyShade>),
        (status = 400, description = "Hex inválido em `existing`")
    ),
    security(("api_jwt" = []))
)]
pub async fn neutral_ramp(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<NeutralRampPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let levels = existing_levels(&payload.existing)
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(generate_grey_shades(&levels)))
}

// POST /api/colors/container
#[utoipa::path(
    post,
    path = "/api/colors/container",
    tag = "Colors",
    request_body = ContainerPayload,
    responses((status = 200, body = ContainerColors), (status = 400, description = "Hex inválido")),
    security(("api_jwt" = []))
)]
pub async fn container_colors(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ContainerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let colors = generate_container_colors(&payload.hex)
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(colors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_uses_default_ramps() {
        let payload = DeriveColorPayload {
            hex: "FF0000".into(),
            tint_percents: None,
            shade_percents: None,
        };
        let derived = derive(&payload).unwrap();
        assert_eq!(derived.hex, "#ff0000");
        assert_eq!(derived.rgb, "rgb(255, 0, 0)");
        assert_eq!(derived.hsl, "hsl(0, 100%, 50%)");
        assert_eq!(derived.ramps.tints.len(), 3);
        assert_eq!(derived.ramps.shades[0], "#cc0000");
    }

    #[test]
    fn percent_over_100_is_a_bad_request() {
        let payload = DeriveColorPayload {
            hex: "#123456".into(),
            tint_percents: Some(vec![150]),
            shade_percents: None,
        };
        assert!(matches!(derive(&payload), Err(AppError::InvalidColor(_))));
    }

    #[test]
    fn payload_rejects_short_hex() {
        let payload = ContainerPayload { hex: "#fff".into() };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn invalid_existing_grey_is_rejected() {
        assert!(matches!(
            existing_levels(&["#ffffff".into(), "cinza".into()]),
            Err(ColorError::InvalidHex(hex)) if hex == "cinza"
        ));
        assert_eq!(existing_levels(&["#000000".into(), "FFFFFF".into()]).unwrap(), vec![1, 11]);
    }

}
