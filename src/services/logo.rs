// src/services/logo.rs
//
// Regras de variante (clara/escura) e montagem das URLs de download.
// Nada aqui faz I/O: só monta strings e planos.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    models::asset::{LogoData, LogoFormat, LogoType, Variant},
};

pub const PACKAGE_PNG_SIZES: [u32; 3] = [512, 1024, 2048];
pub const PACKAGE_ICO_SIZES: [u32; 3] = [16, 32, 48];
pub const PACKAGE_VECTOR_FORMATS: [LogoFormat; 4] =
    [LogoFormat::Svg, LogoFormat::Eps, LogoFormat::Ai, LogoFormat::Pdf];

fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Upload de logo: svg, png, jpg/jpeg, pdf, ai ou eps.
pub fn validate_upload_file_name(file_name: &str) -> Result<LogoFormat, AppError> {
    let format = match extension_of(file_name).as_str() {
        "svg" => LogoFormat::Svg,
        "png" => LogoFormat::Png,
        "jpg" | "jpeg" => LogoFormat::Jpg,
        "pdf" => LogoFormat::Pdf,
        "ai" => LogoFormat::Ai,
        "eps" => LogoFormat::Eps,
        _ => return Err(AppError::UnsupportedFileType(file_name.to_string())),
    };
    Ok(format)
}

/// Upload de fonte: ttf, otf, woff ou woff2. Devolve o MIME correspondente.
pub fn validate_font_file_name(file_name: &str) -> Result<&'static str, AppError> {
    let mime = match extension_of(file_name).as_str() {
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => return Err(AppError::UnsupportedFileType(file_name.to_string())),
    };
    Ok(mime)
}

// =============================================================================
//  URL "SEGURA"
// =============================================================================

/// Opções da URL de arquivo. `None` = o servidor usa o padrão
/// (preserveRatio = true, preserveVector = false, formato/tamanho originais).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UrlOptions {
    pub format: Option<LogoFormat>,
    pub size: Option<u32>,
    pub variant: Option<Variant>,
    pub preserve_ratio: Option<bool>,
    pub preserve_vector: Option<bool>,
}

impl UrlOptions {
    pub fn dark(mut self) -> Self {
        self.variant = Some(Variant::Dark);
        self
    }

    pub fn wants_dark(&self) -> bool {
        self.variant == Some(Variant::Dark)
    }
}

/// URL do arquivo com `clientId` obrigatório e `t` para furar o cache.
/// Sem o `clientId` o servidor de arquivos não consegue isolar os clientes.
pub fn secure_asset_url(base: &str, asset_id: i32, client_id: i32, options: &UrlOptions) -> String {
    secure_asset_url_at(base, asset_id, client_id, options, Utc::now().timestamp_millis())
}

pub fn secure_asset_url_at(
    base: &str,
    asset_id: i32,
    client_id: i32,
    options: &UrlOptions,
    t_millis: i64,
) -> String {
    let mut params: Vec<(&str, String)> = vec![("clientId", client_id.to_string())];

    if options.wants_dark() {
        params.push(("variant", "dark".to_string()));
    }
    if let Some(format) = options.format {
        params.push(("format", format.extension().to_string()));
    }
    if let Some(size) = options.size {
        params.push(("size", size.to_string()));
    }
    if let Some(preserve_ratio) = options.preserve_ratio {
        params.push(("preserveRatio", preserve_ratio.to_string()));
    }
    if let Some(preserve_vector) = options.preserve_vector {
        params.push(("preserveVector", preserve_vector.to_string()));
    }
    params.push(("t", t_millis.to_string()));

    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}/api/assets/{}/file?{}", base.trim_end_matches('/'), asset_id, query)
}

// =============================================================================
//  RESOLUÇÃO DE VARIANTE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoSources {
    pub light_url: String,
    pub dark_url: String,
    /// Não existe arquivo escuro: a UI aplica um filtro `invert` na versão clara.
    pub invert_dark: bool,
}

/// Escolhe a fonte da imagem para a variante pedida.
/// Escuro só quando o asset realmente tem a variante; senão cai na clara.
pub fn resolve_variant_url(
    base: &str,
    asset_id: i32,
    client_id: i32,
    logo: &LogoData,
    requested: Variant,
    t_millis: i64,
) -> (String, bool) {
    let options = UrlOptions::default();
    match requested {
        Variant::Dark if logo.has_dark_variant => (
            secure_asset_url_at(base, asset_id, client_id, &options.dark(), t_millis),
            false,
        ),
        Variant::Dark => (secure_asset_url_at(base, asset_id, client_id, &options, t_millis), true),
        Variant::Light => (secure_asset_url_at(base, asset_id, client_id, &options, t_millis), false),
    }
}

pub fn resolve_sources(base: &str, asset_id: i32, client_id: i32, logo: &LogoData, t_millis: i64) -> LogoSources {
    let (light_url, _) = resolve_variant_url(base, asset_id, client_id, logo, Variant::Light, t_millis);
    let (dark_url, invert_dark) = resolve_variant_url(base, asset_id, client_id, logo, Variant::Dark, t_millis);

    LogoSources {
        light_url,
        dark_url,
        invert_dark,
    }
}

/// A variante efetivamente servida: pedir escuro sem arquivo escuro devolve o claro.
pub fn effective_variant(logo: &LogoData, requested: Variant) -> Variant {
    match requested {
        Variant::Dark if logo.has_dark_variant => Variant::Dark,
        _ => Variant::Light,
    }
}

// =============================================================================
//  PLANO DO PACOTE ZIP
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Caminho dentro do ZIP, ex.: `PNG/acme-512.png`
    pub path: String,
    pub format: LogoFormat,
    pub size: Option<u32>,
    pub preserve_vector: bool,
}

pub fn slugify(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { "logo".to_string() } else { slug }
}

/// Monta a lista de arquivos do pacote "todos os tamanhos":
/// `PNG/` sempre, `Vector/` se o original for vetorial, `ICO/` só para favicon.
pub fn plan_package(asset_name: &str, logo: &LogoData, variant: Variant) -> Vec<PackageEntry> {
    let mut stem = slugify(asset_name);
    if effective_variant(logo, variant) == Variant::Dark {
        stem.push_str("-dark");
    }

    let mut entries: Vec<PackageEntry> = PACKAGE_PNG_SIZES
        .iter()
        .map(|size| PackageEntry {
            path: format!("PNG/{stem}-{size}.png"),
            format: LogoFormat::Png,
            size: Some(*size),
            preserve_vector: false,
        })
        .collect();

    if logo.format.is_vector() {
        entries.extend(PACKAGE_VECTOR_FORMATS.iter().map(|format| PackageEntry {
            path: format!("Vector/{stem}.{}", format.extension()),
            format: *format,
            size: None,
            preserve_vector: true,
        }));
    }

    if logo.logo_type == LogoType::Favicon {
        entries.extend(PACKAGE_ICO_SIZES.iter().map(|size| PackageEntry {
            path: format!("ICO/{stem}-{size}.ico"),
            format: LogoFormat::Ico,
            size: Some(*size),
            preserve_vector: false,
        }));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn logo(logo_type: LogoType, format: LogoFormat, has_dark: bool) -> LogoData {
        LogoData {
            logo_type,
            format,
            file_name: format!("logo.{}", format.extension()),
            has_dark_variant: has_dark,
            is_dark_variant: false,
            description: None,
            figma_link: None,
        }
    }

    #[test]
    fn url_always_carries_client_and_timestamp() {
        let url = secure_asset_url("", 5, 9, &UrlOptions::default());
        assert!(url.starts_with("/api/assets/5/file?"));
        assert!(url.contains("clientId=9"));
        assert!(url.contains("&t="));
        assert!(!url.contains("variant="));
    }

    #[test]
    fn dark_variant_is_only_added_when_requested() {
        let url = secure_asset_url_at("", 5, 9, &UrlOptions::default().dark(), 1);
        assert_eq!(url, "/api/assets/5/file?clientId=9&variant=dark&t=1");

        let light = UrlOptions {
            variant: Some(Variant::Light),
            ..Default::default()
        };
        assert!(!secure_asset_url_at("", 5, 9, &light, 1).contains("variant"));
    }

    #[test]
    fn optional_parameters_are_appended_in_order() {
        let options = UrlOptions {
            format: Some(LogoFormat::Png),
            size: Some(1024),
            variant: None,
            preserve_ratio: Some(true),
            preserve_vector: Some(false),
        };
        assert_eq!(
            secure_asset_url_at("https://brand.example.com/", 5, 9, &options, 1700000000000),
            "https://brand.example.com/api/assets/5/file?clientId=9&format=png&size=1024&preserveRatio=true&preserveVector=false&t=1700000000000"
        );
    }

    #[test]
    fn dark_source_falls_back_to_inverted_light() {
        let sources = resolve_sources("", 5, 9, &logo(LogoType::Main, LogoFormat::Svg, false), 7);
        assert_eq!(sources.dark_url, sources.light_url);
        assert!(sources.invert_dark);

        let sources = resolve_sources("", 5, 9, &logo(LogoType::Main, LogoFormat::Svg, true), 7);
        assert!(sources.dark_url.contains("variant=dark"));
        assert!(!sources.invert_dark);
    }

    #[test]
    fn upload_extensions_are_checked() {
        assert_eq!(validate_upload_file_name("acme.SVG").unwrap(), LogoFormat::Svg);
        assert_eq!(validate_upload_file_name("acme.final.jpeg").unwrap(), LogoFormat::Jpg);
        assert!(matches!(
            validate_upload_file_name("acme.gif"),
            Err(AppError::UnsupportedFileType(_))
        ));
        assert!(validate_upload_file_name("acme").is_err());
    }

    #[test]
    fn font_uploads_have_their_own_list() {
        assert_eq!(validate_font_file_name("Inter-Regular.ttf").unwrap(), "font/ttf");
        assert_eq!(validate_font_file_name("Inter.WOFF2").unwrap(), "font/woff2");
        assert!(validate_upload_file_name("Inter-Regular.ttf").is_err());
        assert!(validate_font_file_name("acme.svg").is_err());
    }

    #[test]
    fn raster_package_has_only_png_folder() {
        let plan = plan_package("Acme Logo", &logo(LogoType::Main, LogoFormat::Png, false), Variant::Light);
        let paths: Vec<&str> = plan.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["PNG/acme-logo-512.png", "PNG/acme-logo-1024.png", "PNG/acme-logo-2048.png"]
        );
    }

    #[test]
    fn vector_favicon_package_has_all_folders() {
        let plan = plan_package("Favicon", &logo(LogoType::Favicon, LogoFormat::Svg, true), Variant::Dark);
        assert_eq!(plan.len(), 3 + 4 + 3);
        assert!(plan.iter().any(|e| e.path == "Vector/favicon-dark.eps" && e.preserve_vector));
        assert!(plan.iter().any(|e| e.path == "ICO/favicon-dark-32.ico" && e.size == Some(32)));
    }

    #[test]
    fn dark_package_without_dark_file_uses_light_names() {
        let plan = plan_package("Acme", &logo(LogoType::Main, LogoFormat::Png, false), Variant::Dark);
        assert!(plan.iter().all(|e| !e.path.contains("-dark")));
    }
}
