// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário (um arquivo JSON por idioma)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas por idioma e chave.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de idioma inválido: {lang}"))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Busca a mensagem no idioma pedido, caindo para inglês e, por último, para a própria chave.
    /// Os parâmetros substituem os marcadores `{nome}` da mensagem.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)));

        let Some(template) = template else {
            return key.to_string();
        };

        params.iter().fold(template.clone(), |msg, (name, value)| {
            msg.replace(&format!("{{{name}}}"), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_params() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate("pt", "resource_not_found", &[("resource", "Produto".into())]);
        assert_eq!(msg, "Produto não encontrado.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("de", "stage_conflict", &[]),
            "The product was moved by someone else. Reload and try again."
        );
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("en", "no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let mut en: Vec<_> = store.catalogs["en"].keys().collect();
        let mut pt: Vec<_> = store.catalogs["pt"].keys().collect();
        en.sort();
        pt.sort();
        assert_eq!(en, pt);
    }
}
