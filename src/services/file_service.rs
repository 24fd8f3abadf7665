// src/services/file_service.rs

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::{
    common::{error::AppError, upstream::ensure_success},
    db::AssetRepository,
    models::asset::{AssetData, AssetFile, LogoData, LogoFormat, Variant},
    services::logo::{effective_variant, UrlOptions},
};

#[derive(Debug, Clone, PartialEq)]
pub struct FileRequest {
    pub asset_id: i32,
    pub client_id: i32,
    pub options: UrlOptions,
}

#[derive(Debug, Clone)]
pub struct FileBlob {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// De onde vêm os bytes de um asset (original ou convertido).
#[async_trait]
pub trait AssetFileSource: Send + Sync {
    async fn fetch(&self, request: &FileRequest) -> Result<FileBlob, AppError>;
}

// ---
// Cliente do serviço externo de conversão/redimensionamento
// ---
#[derive(Clone)]
pub struct ConverterClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConverterClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn convert(&self, file: &AssetFile, format: LogoFormat, options: &UrlOptions) -> Result<FileBlob, AppError> {
        // Padrões do lado servidor: preserveRatio = true, preserveVector = false
        let mut query: Vec<(&str, String)> = vec![
            ("format", format.extension().to_string()),
            ("preserveRatio", options.preserve_ratio.unwrap_or(true).to_string()),
            ("preserveVector", options.preserve_vector.unwrap_or(false).to_string()),
        ];
        if let Some(size) = options.size {
            query.push(("size", size.to_string()));
        }

        let response = self
            .http
            .post(format!("{}/convert", self.base_url))
            .query(&query)
            .header(CONTENT_TYPE, file.mime_type.as_str())
            .body(file.bytes.clone())
            .send()
            .await?;
        let response = ensure_success("converter", response).await?;

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(format.mime_type())
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        let stem = file
            .file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&file.file_name);
        let file_name = match options.size {
            Some(size) => format!("{stem}-{size}.{}", format.extension()),
            None => format!("{stem}.{}", format.extension()),
        };

        Ok(FileBlob {
            file_name,
            mime_type,
            bytes,
        })
    }
}

// ---
// Implementação padrão: originais no banco + conversor quando precisa
// ---
#[derive(Clone)]
pub struct StoredFileSource {
    repo: AssetRepository,
    converter: Option<ConverterClient>,
}

impl StoredFileSource {
    pub fn new(repo: AssetRepository, converter: Option<ConverterClient>) -> Self {
        Self { repo, converter }
    }
}

/// Variantes a tentar, em ordem. Escuro pedido cai no claro se o arquivo
/// escuro não existir.
pub fn variant_order(logo: Option<&LogoData>, requested: Variant) -> Vec<Variant> {
    match logo.map(|l| effective_variant(l, requested)) {
        Some(Variant::Dark) => vec![Variant::Dark, Variant::Light],
        _ => vec![Variant::Light],
    }
}

/// Precisa de conversão se pediram outro formato ou um tamanho específico.
pub fn needs_conversion(original: Option<LogoFormat>, options: &UrlOptions) -> bool {
    let other_format = match (options.format, original) {
        (Some(requested), Some(original)) => requested != original,
        (Some(_), None) => true,
        (None, _) => false,
    };
    other_format || options.size.is_some()
}

#[async_trait]
impl AssetFileSource for StoredFileSource {
    async fn fetch(&self, request: &FileRequest) -> Result<FileBlob, AppError> {
        let asset = self
            .repo
            .find(self.repo.pool(), request.client_id, request.asset_id)
            .await?
            .ok_or(AppError::AssetNotFound(request.asset_id))?;

        let requested = request.options.variant.unwrap_or_default();
        let logo = match asset.parsed() {
            Ok(AssetData::Logo(logo)) => Some(logo),
            _ => None,
        };

        let mut file = None;
        for variant in variant_order(logo.as_ref(), requested) {
            file = self.repo.find_file(self.repo.pool(), asset.id, variant).await?;
            if file.is_some() {
                break;
            }
            tracing::debug!("Asset {} sem arquivo {:?}; tentando o próximo", asset.id, variant);
        }
        let file = file.ok_or(AppError::FileNotFound(asset.id))?;

        let original = logo.as_ref().map(|l| l.format);
        if !needs_conversion(original, &request.options) {
            return Ok(FileBlob {
                file_name: file.file_name,
                mime_type: file.mime_type,
                bytes: file.bytes,
            });
        }

        let converter = self.converter.as_ref().ok_or(AppError::ConversionUnavailable)?;
        let format = request
            .options
            .format
            .or(original)
            .ok_or(AppError::ConversionUnavailable)?;

        converter.convert(&file, format, &request.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::LogoType;

    #[test]
    fn original_is_served_when_nothing_changes() {
        assert!(!needs_conversion(Some(LogoFormat::Svg), &UrlOptions::default()));
        let same = UrlOptions {
            format: Some(LogoFormat::Svg),
            ..Default::default()
        };
        assert!(!needs_conversion(Some(LogoFormat::Svg), &same));
    }

    #[test]
    fn format_or_size_change_requires_conversion() {
        let png = UrlOptions {
            format: Some(LogoFormat::Png),
            ..Default::default()
        };
        assert!(needs_conversion(Some(LogoFormat::Svg), &png));

        let sized = UrlOptions {
            size: Some(512),
            ..Default::default()
        };
        assert!(needs_conversion(Some(LogoFormat::Png), &sized));
    }

    fn logo(has_dark: bool) -> LogoData {
        LogoData {
            logo_type: LogoType::Main,
            format: LogoFormat::Svg,
            file_name: "acme.svg".into(),
            has_dark_variant: has_dark,
            is_dark_variant: false,
            description: None,
            figma_link: None,
        }
    }

    #[test]
    fn dark_request_falls_back_to_light() {
        assert_eq!(variant_order(Some(&logo(true)), Variant::Dark), vec![Variant::Dark, Variant::Light]);
        assert_eq!(variant_order(Some(&logo(false)), Variant::Dark), vec![Variant::Light]);
        assert_eq!(variant_order(Some(&logo(true)), Variant::Light), vec![Variant::Light]);
        assert_eq!(variant_order(None, Variant::Dark), vec![Variant::Light]);
    }

}
