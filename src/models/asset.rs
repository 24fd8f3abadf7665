// src/models/asset.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;

// --- ENUMS ---

// Mapeia o CREATE TYPE asset_category do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "asset_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Logo,
    Color,
    Font,
}

// Mapeia o CREATE TYPE logo_type do banco.
// Também é o "tipo de seção" das seções ocultas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "logo_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LogoType {
    Main,
    Horizontal,
    Vertical,
    Square,
    AppIcon,
    Favicon,
}

impl LogoType {
    pub const ALL: [LogoType; 6] = [
        LogoType::Main,
        LogoType::Horizontal,
        LogoType::Vertical,
        LogoType::Square,
        LogoType::AppIcon,
        LogoType::Favicon,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "asset_variant", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Light,
    Dark,
}

/// Formatos de arquivo de logo aceitos no upload e oferecidos no download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogoFormat {
    Svg,
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
    Pdf,
    Ai,
    Eps,
    Ico,
}

impl LogoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            LogoFormat::Svg => "svg",
            LogoFormat::Png => "png",
            LogoFormat::Jpg => "jpg",
            LogoFormat::Pdf => "pdf",
            LogoFormat::Ai => "ai",
            LogoFormat::Eps => "eps",
            LogoFormat::Ico => "ico",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            LogoFormat::Svg => "image/svg+xml",
            LogoFormat::Png => "image/png",
            LogoFormat::Jpg => "image/jpeg",
            LogoFormat::Pdf => "application/pdf",
            LogoFormat::Ai => "application/postscript",
            LogoFormat::Eps => "application/postscript",
            LogoFormat::Ico => "image/x-icon",
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(
            self,
            LogoFormat::Svg | LogoFormat::Pdf | LogoFormat::Ai | LogoFormat::Eps
        )
    }
}

// --- O REGISTRO (como vem do banco) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandAsset {
    #[schema(example = 5)]
    pub id: i32,
    #[schema(example = 9)]
    pub client_id: i32,
    #[schema(example = "Logo principal")]
    pub name: String,
    pub category: AssetCategory,

    // Payload polimórfico; o formato depende de `category`.
    // Use `AssetData::parse` antes de confiar no conteúdo.
    #[schema(value_type = Object)]
    pub data: Value,

    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BrandAsset {
    pub fn parsed(&self) -> Result<AssetData, AssetParseError> {
        AssetData::parse(self.category, &self.data)
    }
}

/// Arquivo original armazenado para uma variante do asset.
#[derive(Debug, Clone, FromRow)]
pub struct AssetFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// --- PAYLOADS TIPADOS (a união) ---

#[derive(Debug, Error, PartialEq)]
pub enum AssetParseError {
    #[error("dados de logo inválidos: {0}")]
    Logo(String),
    #[error("dados de cor inválidos: {0}")]
    Color(String),
    #[error("dados de fonte inválidos: {0}")]
    Font(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssetData {
    Logo(LogoData),
    Color(ColorData),
    Font(FontData),
}

impl AssetData {
    /// Valida o JSON de acordo com a categoria (o discriminante).
    pub fn parse(category: AssetCategory, raw: &Value) -> Result<Self, AssetParseError> {
        match category {
            AssetCategory::Logo => serde_json::from_value::<LogoData>(raw.clone())
                .map(AssetData::Logo)
                .map_err(|e| AssetParseError::Logo(e.to_string())),
            AssetCategory::Color => {
                let color = serde_json::from_value::<ColorData>(raw.clone())
                    .map_err(|e| AssetParseError::Color(e.to_string()))?;
                if color.colors.is_empty() {
                    return Err(AssetParseError::Color("lista de cores vazia".into()));
                }
                Ok(AssetData::Color(color))
            }
            AssetCategory::Font => serde_json::from_value::<FontData>(raw.clone())
                .map(AssetData::Font)
                .map_err(|e| AssetParseError::Font(e.to_string())),
        }
    }

    pub fn to_value(&self) -> Value {
        // Serialização de structs simples não falha
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoData {
    #[serde(rename = "type")]
    pub logo_type: LogoType,
    pub format: LogoFormat,
    pub file_name: String,
    #[serde(default)]
    pub has_dark_variant: bool,
    #[serde(default)]
    pub is_dark_variant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figma_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorKind {
    Solid,
    Gradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorGroup {
    Brand,
    Neutral,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorValue {
    #[schema(example = "#1a73e8")]
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmyk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pantone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorStep {
    pub percentage: u8,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorData {
    #[serde(rename = "type")]
    pub kind: ColorKind,
    pub category: ColorGroup,
    pub colors: Vec<ColorValue>,
    // Sempre derivados; o que vier do cliente é descartado na gravação.
    #[serde(default)]
    pub tints: Vec<ColorStep>,
    #[serde(default)]
    pub shades: Vec<ColorStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    Google,
    Adobe,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FontData {
    pub source: FontSource,
    #[serde(default)]
    pub weights: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub source_data: Value,
}
