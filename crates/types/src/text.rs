//! Locale-keyed text shown to participants.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Locale used when a plain string is supplied and as the lookup fallback.
pub const DEFAULT_LOCALE: &str = "en";

/// Human readable text keyed by locale (`en`, `nl`, ...).
///
/// Authors may write either a plain string or a `{locale: text}` map; both
/// deserialize into the same value. Serialization always produces the
/// `{"translations": {...}}` shape expected by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TranslatableRepr")]
pub struct Translatable {
    /// Text per locale, in authoring order.
    pub translations: IndexMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranslatableRepr {
    Text(String),
    Wrapped { translations: IndexMap<String, String> },
    Map(IndexMap<String, String>),
}

impl From<TranslatableRepr> for Translatable {
    fn from(repr: TranslatableRepr) -> Self {
        match repr {
            TranslatableRepr::Text(text) => Translatable::from(text),
            TranslatableRepr::Wrapped { translations } | TranslatableRepr::Map(translations) => Self { translations },
        }
    }
}

impl From<String> for Translatable {
    fn from(text: String) -> Self {
        let mut translations = IndexMap::new();
        translations.insert(DEFAULT_LOCALE.to_string(), text);
        Self { translations }
    }
}

impl From<&str> for Translatable {
    fn from(text: &str) -> Self {
        Translatable::from(text.to_string())
    }
}

impl Translatable {
    /// Creates an empty translatable with no locales.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the text for `locale`.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(locale.into(), text.into());
        self
    }

    /// Returns the text for `locale`, falling back to English and then to
    /// whichever locale was authored first.
    pub fn text(&self, locale: &str) -> Option<&str> {
        self.translations
            .get(locale)
            .or_else(|| self.translations.get(DEFAULT_LOCALE))
            .or_else(|| self.translations.values().next())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// True when no locale carries any visible text.
    pub fn is_blank(&self) -> bool {
        self.translations.values().all(|text| text.trim().is_empty())
    }
}
