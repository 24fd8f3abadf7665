// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::auth::get_me,

        // --- Assets ---
        handlers::assets::list_assets,
        handlers::assets::get_asset,
        handlers::assets::create_asset,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        handlers::assets::schedule_description,
        handlers::assets::cancel_description,

        // --- Logos ---
        handlers::assets::list_logo_sections,
        handlers::assets::download_url,
        handlers::assets::download_package,
        handlers::assets::get_asset_file,

        // --- Personas ---
        handlers::personas::list_personas,
        handlers::personas::get_persona,
        handlers::personas::create_persona,
        handlers::personas::update_persona,
        handlers::personas::delete_persona,

        // --- Sections ---
        handlers::sections::list_hidden_sections,
        handlers::sections::hide_section,
        handlers::sections::show_section,

        // --- Fonts ---
        handlers::fonts::list_google_fonts,

        // --- Colors ---
        handlers::colors::derive_color,
        handlers::colors::neutral_ramp,
        handlers::colors::container_colors,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::rbac::Action,
            models::rbac::Resource,
            models::rbac::Capability,
            handlers::auth::MeResponse,

            // --- Assets ---
            models::asset::AssetCategory,
            models::asset::LogoType,
            models::asset::Variant,
            models::asset::LogoFormat,
            models::asset::BrandAsset,
            models::asset::LogoData,
            models::asset::ColorKind,
            models::asset::ColorGroup,
            models::asset::ColorValue,
            models::asset::ColorStep,
            models::asset::ColorData,
            models::asset::FontSource,
            models::asset::FontData,
            handlers::assets::CreateAssetPayload,
            handlers::assets::UpdateAssetPayload,
            handlers::assets::DescriptionPayload,

            // --- Logos ---
            services::logo::UrlOptions,
            services::logo::LogoSources,
            services::asset_service::LogoView,
            services::asset_service::LogoSectionView,

            // --- Personas ---
            models::persona::PersonaMetrics,
            models::persona::UserPersona,
            handlers::personas::CreatePersonaPayload,
            handlers::personas::UpdatePersonaPayload,

            // --- Sections ---
            models::section::HiddenSection,
            models::section::HideSectionPayload,

            // --- Fonts ---
            services::font_service::GoogleFont,

            // --- Colors ---
            services::color::TintsAndShades,
            services::color::GreyShade,
            services::color::ContainerColors,
            handlers::colors::DeriveColorPayload,
            handlers::colors::DerivedColor,
            handlers::colors::NeutralRampPayload,
            handlers::colors::ContainerPayload,
        )
    ),
    tags(
        (name = "Users", description = "Usuário atual e capacidades do papel"),
        (name = "Assets", description = "Logos, cores e fontes do cliente"),
        (name = "Logos", description = "Variantes, URLs de download e pacotes ZIP"),
        (name = "Personas", description = "Personas de usuário"),
        (name = "Sections", description = "Seções de logo ocultas"),
        (name = "Fonts", description = "Catálogo do Google Fonts"),
        (name = "Colors", description = "Derivação de cores")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
