// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário: { "codigo": "mensagem com {detail}" }
const CATALOGS: [(&str, &str); 2] = [
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("catálogo '{}' inválido: {}", lang, e))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Busca a mensagem no idioma pedido, depois no padrão, depois devolve o próprio código.
    pub fn translate(&self, lang: &str, code: &str, detail: Option<&str>) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(code))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(code)));

        match template {
            Some(t) => t.replace("{detail}", detail.unwrap_or("")).trim().to_string(),
            None => code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_exists_in_every_catalog() {
        let store = I18nStore::load().unwrap();
        let en = &store.catalogs["en"];
        for (lang, catalog) in &store.catalogs {
            for key in en.keys() {
                assert!(catalog.contains_key(key), "'{key}' ausente em {lang}");
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("de", "missing_client_id", None),
            store.translate("en", "missing_client_id", None)
        );
        assert_eq!(store.translate("en", "no_such_code", None), "no_such_code");
    }
}
