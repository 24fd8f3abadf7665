// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Idiomas com catálogo em `locales/`
const SUPPORTED_LANGS: [&str; 2] = ["en", "pt"];

// Extrator de idioma a partir do Accept-Language
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma suportado da lista (ordenada por peso); senão o padrão.
    pub fn from_header(raw: &str) -> Self {
        let lang = accept_language::parse(raw)
            .iter()
            // "pt-BR" -> "pt"
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
            .find(|primary| SUPPORTED_LANGS.contains(&primary.as_str()))
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_else(|| Locale(DEFAULT_LANG.to_string()));

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9,en;q=0.8").0, "pt");
        assert_eq!(Locale::from_header("de-DE,de;q=0.9,en;q=0.5").0, "en");
        assert_eq!(Locale::from_header("fr").0, "en");
        assert_eq!(Locale::from_header("").0, "en");
    }
}
