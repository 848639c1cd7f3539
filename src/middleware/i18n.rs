// src/middleware/i18n.rs

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

const DEFAULT_LANG: &str = "en";

// Idioma preferido do cliente (só o código primário: "pt-BR" -> "pt")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| {
                accept_language::parse(raw)
                    .first()
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
            })
            .filter(|lang| !lang.is_empty())
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn locale_for(value: &str) -> Locale {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_str(value).unwrap());
        Locale::from_headers(&headers)
    }

    #[test]
    fn keeps_only_the_primary_subtag_of_the_preferred_language() {
        assert_eq!(locale_for("pt-BR,pt;q=0.9,en;q=0.8"), Locale("pt".into()));
        assert_eq!(locale_for("en-US"), Locale("en".into()));
    }

    #[test]
    fn missing_header_defaults_to_english() {
        assert_eq!(Locale::from_headers(&HeaderMap::new()), Locale("en".into()));
    }
}
