//! Researcher-authored donation configuration.
//!
//! A configuration lists the platforms a participant is asked about, in
//! order, and for each platform the tables to extract from its export. The
//! order of platforms and tables is fixed at load time and never mutated by
//! the workflow.

use serde::{Deserialize, Serialize, de::IgnoredAny};

use crate::text::Translatable;

/// Ordered list of platforms for one donation session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationConfig {
    /// Platforms in the order the participant visits them.
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,
}

impl DonationConfig {
    /// Names of the configured platforms, in visiting order.
    pub fn platform_names(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(|platform| platform.platform.as_str())
    }

    pub fn find(&self, platform: &str) -> Option<&PlatformConfig> {
        self.platforms.iter().find(|entry| entry.platform == platform)
    }
}

/// Tables requested from a single platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Registry key of the platform (for example `YouTube`).
    pub platform: String,
    /// Table specifications in donation/display order.
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

/// Describes one output table the researcher wants extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Name of the extractor-provided table function (for example `watch_history`).
    pub name: String,
    /// Title shown above the table in the consent form.
    pub title: Translatable,
    /// Explanatory copy shown with the table.
    #[serde(default)]
    pub description: Translatable,
    /// Output column names, applied positionally. When absent the extractor's
    /// own column names pass through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Visualizations rendered next to the table.
    #[serde(default)]
    pub visuals: Vec<VisualSpec>,
}

/// Visualization request, tagged by `name`.
///
/// Any entry that is not a complete known visualization (unknown tag,
/// missing `name`, missing fields) deserializes into
/// [`VisualSpec::Unsupported`] so the rest of the configuration still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", from = "VisualSpecRepr")]
pub enum VisualSpec {
    #[serde(rename = "wordcloud")]
    Wordcloud {
        title: Translatable,
        #[serde(rename = "textColumn")]
        text_column: String,
    },
    Unsupported,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VisualSpecRepr {
    Known(KnownVisual),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(tag = "name")]
enum KnownVisual {
    #[serde(rename = "wordcloud")]
    Wordcloud {
        title: Translatable,
        #[serde(rename = "textColumn")]
        text_column: String,
    },
}

impl From<VisualSpecRepr> for VisualSpec {
    fn from(repr: VisualSpecRepr) -> Self {
        match repr {
            VisualSpecRepr::Known(KnownVisual::Wordcloud { title, text_column }) => VisualSpec::Wordcloud { title, text_column },
            VisualSpecRepr::Other(_) => VisualSpec::Unsupported,
        }
    }
}
