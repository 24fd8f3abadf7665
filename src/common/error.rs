use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::{
        asset::AssetParseError,
        rbac::{Action, Resource},
    },
    services::color::ColorError,
};

// O erro de domínio. Os handlers convertem para `ApiError` com o idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Cor inválida: {0}")]
    InvalidColor(#[from] ColorError),

    #[error("Dados do asset inválidos: {0}")]
    InvalidAssetData(#[from] AssetParseError),

    #[error("Tipo de arquivo não suportado: {0}")]
    UnsupportedFileType(String),

    #[error("Arquivo ausente no upload")]
    MissingFile,

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("O parâmetro clientId é obrigatório")]
    MissingClientId,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Sem permissão para {action:?} em {resource:?}")]
    Forbidden { action: Action, resource: Resource },

    #[error("Asset {0} não encontrado")]
    AssetNotFound(i32),

    #[error("Persona {0} não encontrada")]
    PersonaNotFound(i32),

    #[error("Arquivo do asset {0} não encontrado")]
    FileNotFound(i32),

    #[error("O asset {0} não possui variante escura")]
    NoDarkVariant(i32),

    #[error("Conversão de formato indisponível")]
    ConversionUnavailable,

    #[error("Catálogo de fontes indisponível")]
    FontsUnavailable,

    #[error("Falha no serviço {service} ({status}): {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de HTTP: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Erro ao montar o pacote ZIP: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidColor(_)
            | AppError::InvalidAssetData(_)
            | AppError::UnsupportedFileType(_)
            | AppError::MissingFile
            | AppError::InvalidBody(_)
            | AppError::MissingClientId => StatusCode::BAD_REQUEST,
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::AssetNotFound(_)
            | AppError::PersonaNotFound(_)
            | AppError::FileNotFound(_)
            | AppError::NoDarkVariant(_) => StatusCode::NOT_FOUND,
            AppError::ConversionUnavailable => StatusCode::NOT_IMPLEMENTED,
            AppError::FontsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { .. } | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::Zip(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Chave da mensagem nos catálogos de `locales/`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::InvalidColor(_) => "invalid_color",
            AppError::InvalidAssetData(_) => "invalid_asset_data",
            AppError::UnsupportedFileType(_) => "unsupported_file_type",
            AppError::MissingFile => "missing_file",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::MissingClientId => "missing_client_id",
            AppError::InvalidToken | AppError::JwtError(_) => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::Forbidden { .. } => "forbidden",
            AppError::AssetNotFound(_) => "asset_not_found",
            AppError::PersonaNotFound(_) => "persona_not_found",
            AppError::FileNotFound(_) => "file_not_found",
            AppError::NoDarkVariant(_) => "no_dark_variant",
            AppError::ConversionUnavailable => "conversion_unavailable",
            AppError::FontsUnavailable => "fonts_unavailable",
            AppError::Upstream { .. } | AppError::HttpClient(_) => "upstream",
            AppError::DatabaseError(_) | AppError::Zip(_) | AppError::InternalServerError(_) => "internal",
        }
    }

    // O valor que entra no `{detail}` da mensagem traduzida
    fn detail(&self) -> Option<String> {
        match self {
            AppError::InvalidColor(e) => Some(e.to_string()),
            AppError::InvalidAssetData(e) => Some(e.to_string()),
            AppError::UnsupportedFileType(name) => Some(name.clone()),
            AppError::InvalidBody(msg) => Some(msg.clone()),
            AppError::Forbidden { action, resource } => {
                Some(format!("{}:{}", resource.slug(), action.slug()))
            }
            AppError::AssetNotFound(id)
            | AppError::PersonaNotFound(id)
            | AppError::FileNotFound(id)
            | AppError::NoDarkVariant(id) => Some(id.to_string()),
            AppError::Upstream { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Erro {}: {}", status.as_u16(), self);
        }

        let message = store.translate(&locale.0, self.code(), self.detail().as_deref());

        // Erros de validação devolvem os detalhes por campo
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            _ => None,
        };

        ApiError {
            status,
            error: message,
            details,
        }
    }
}

// A rejeição HTTP: `{ "error": ..., "details": ... }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn maps_domain_errors_to_status() {
        assert_eq!(AppError::MissingClientId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Forbidden {
                action: Action::Create,
                resource: Resource::BrandAssets
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::AssetNotFound(5).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Upstream {
                service: "converter",
                status: 500,
                message: "boom".into()
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn messages_are_localized() {
        let err = AppError::UnsupportedFileType("acme.gif".into());
        let en = err.to_api_error(&Locale("en".into()), &store());
        let pt = err.to_api_error(&Locale("pt".into()), &store());
        assert!(en.error.contains("acme.gif"));
        assert!(pt.error.contains("acme.gif"));
        assert_ne!(en.error, pt.error);
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut e = validator::ValidationError::new("length");
        e.message = Some("required".into());
        errors.add("name", e);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["name"][0], "required");
    }
}
