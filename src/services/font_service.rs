// src/services/font_service.rs
//
// Proxy do catálogo do Google Fonts. A chave fica no servidor; o catálogo
// muda pouco, então fica em cache por 24h.

use std::{sync::Arc, time::Duration};

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::{error::AppError, upstream::ensure_success};

pub const GOOGLE_FONTS_API: &str = "https://www.googleapis.com/webfonts/v1/webfonts";
pub const CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleFont {
    #[schema(example = "Inter")]
    pub family: String,
    #[schema(example = "sans-serif")]
    pub category: String,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub subsets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    items: Vec<GoogleFont>,
}

/// Lê a resposta da API e mantém só os campos que a UI usa.
pub fn parse_catalog(body: &str) -> Result<Vec<GoogleFont>, AppError> {
    let response: CatalogResponse =
        serde_json::from_str(body).map_err(|e| anyhow::anyhow!("Catálogo de fontes ilegível: {}", e))?;
    Ok(response.items)
}

#[derive(Clone)]
pub struct FontService {
    http: reqwest::Client,
    api_key: Option<String>,
    catalog_url: String,
    cache: Cache<(), Arc<Vec<GoogleFont>>>,
}

impl FontService {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            catalog_url: GOOGLE_FONTS_API.to_string(),
            cache: Cache::builder().max_capacity(1).time_to_live(CATALOG_TTL).build(),
        }
    }

    pub async fn catalog(&self) -> Result<Arc<Vec<GoogleFont>>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::FontsUnavailable);
        };

        if let Some(cached) = self.cache.get(&()).await {
            return Ok(cached);
        }

        let response = self
            .http
            .get(&self.catalog_url)
            .query(&[("key", api_key), ("sort", "popularity")])
            .send()
            .await?;
        let response = ensure_success("google-fonts", response).await?;
        let body = response.text().await?;

        let fonts = Arc::new(parse_catalog(&body)?);
        tracing::info!("🔤 Catálogo do Google Fonts carregado: {} famílias", fonts.len());
        self.cache.insert((), Arc::clone(&fonts)).await;

        Ok(fonts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_only_the_fields_the_ui_needs() {
        let body = r#"{
            "kind": "webfonts#webfontList",
            "items": [{
                "family": "Inter",
                "category": "sans-serif",
                "variants": ["regular", "700"],
                "subsets": ["latin"],
                "files": { "regular": "http://fonts.gstatic.com/x.ttf" },
                "version": "v13"
            }]
        }"#;

        let fonts = parse_catalog(body).unwrap();
        assert_eq!(
            fonts,
            vec![GoogleFont {
                family: "Inter".into(),
                category: "sans-serif".into(),
                variants: vec!["regular".into(), "700".into()],
                subsets: vec!["latin".into()],
            }]
        );
    }

    #[test]
    fn empty_catalog_is_not_an_error() {
        assert!(parse_catalog("{}").unwrap().is_empty());
        assert!(parse_catalog("<html>").is_err());
    }

    #[tokio::test]
    async fn missing_key_means_unavailable() {
        let service = FontService::new(reqwest::Client::new(), None);
        assert!(matches!(service.catalog().await, Err(AppError::FontsUnavailable)));
    }
}
