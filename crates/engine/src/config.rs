//! Loading the donation configuration from YAML or JSON.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use donation_types::{DonationConfig, PlatformConfig, TableSpec};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

/// Loads a donation configuration file.
///
/// Two document shapes are accepted, tried in order:
///
/// - a list under `platforms:` with one `{platform, tables}` entry per platform
/// - a map from platform name to `{tables}`, in authoring order
///
/// # Examples
///
/// ```rust
/// use donation_engine::parse_config_file;
///
/// let temp_dir = tempfile::tempdir()?;
/// let config_path = temp_dir.path().join("config.yml");
/// std::fs::write(&config_path, r#"
/// YouTube:
///   tables:
///     - name: watch_history
///       title: Watch history
/// "#)?;
///
/// let config = parse_config_file(&config_path)?;
/// assert_eq!(config.platforms[0].platform, "YouTube");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_config_file(file_path: impl AsRef<Path>) -> Result<DonationConfig> {
    let file_path = file_path.as_ref();
    let content = fs::read(file_path).with_context(|| format!("Failed to read donation config: {}", file_path.display()))?;
    parse_config_str(&String::from_utf8_lossy(&content)).with_context(|| format!("Invalid donation config: {}", file_path.display()))
}

/// Parses a donation configuration document. See [`parse_config_file`].
pub fn parse_config_str(content: &str) -> Result<DonationConfig> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct ListDocument {
        platforms: Vec<PlatformConfig>,
    }

    #[derive(Deserialize, Default)]
    struct PlatformTables {
        #[serde(default)]
        tables: Vec<TableSpec>,
    }

    let document: serde_yaml::Value = serde_yaml::from_str(content).context("donation config is not valid YAML")?;

    let config = if document.get("platforms").is_some_and(serde_yaml::Value::is_sequence) {
        let document: ListDocument = serde_yaml::from_str(content).context("invalid `platforms` list")?;
        DonationConfig {
            platforms: document.platforms,
        }
    } else if document.is_mapping() {
        let document: IndexMap<String, Option<PlatformTables>> = serde_yaml::from_str(content).context("invalid platform map")?;
        DonationConfig {
            platforms: document
                .into_iter()
                .map(|(platform, tables)| PlatformConfig {
                    platform,
                    tables: tables.unwrap_or_default().tables,
                })
                .collect(),
        }
    } else {
        return Err(ConfigError::UnsupportedFormat.into());
    };

    if let Some(blank) = config.platforms.iter().position(|entry| entry.platform.trim().is_empty()) {
        return Err(ConfigError::BlankPlatform { position: blank + 1 }.into());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use donation_types::VisualSpec;

    #[test]
    fn parses_map_form_in_authoring_order() {
        let config = parse_config_str(
            r#"
YouTube:
  tables:
    - name: watch_history
      title: {en: Watch history, nl: Kijkgeschiedenis}
      description: Videos you watched
      visuals:
        - name: wordcloud
          title: Channels
          textColumn: channel
Instagram:
TikTok:
  tables: []
"#,
        )
        .expect("parse map form");

        assert_eq!(config.platform_names().collect::<Vec<_>>(), vec!["YouTube", "Instagram", "TikTok"]);
        let table = &config.platforms[0].tables[0];
        assert_eq!(table.title.text("nl"), Some("Kijkgeschiedenis"));
        assert!(matches!(table.visuals[0], VisualSpec::Wordcloud { .. }));
        assert!(config.platforms[1].tables.is_empty());
    }

    #[test]
    fn parses_list_form_and_json() {
        let yaml = parse_config_str(
            r#"
platforms:
  - platform: VideoSite
    tables:
      - name: watch_history
        title: T
        description: D
"#,
        )
        .expect("parse list form");
        assert_eq!(yaml.platforms[0].platform, "VideoSite");

        let json = parse_config_str(r#"{"platforms": [{"platform": "VideoSite", "tables": []}]}"#).expect("parse json");
        assert_eq!(json.platforms.len(), 1);
    }

    #[test]
    fn rejects_unrecognized_documents() {
        let error = parse_config_str("- just\n- a list\n").expect_err("sequence document");
        assert_eq!(error.downcast_ref::<ConfigError>(), Some(&ConfigError::UnsupportedFormat));

        let error = parse_config_str("platforms:\n  - platform: \"  \"\n").expect_err("blank platform");
        assert_eq!(error.downcast_ref::<ConfigError>(), Some(&ConfigError::BlankPlatform { position: 1 }));
    }

    #[test]
    fn malformed_tables_report_the_serde_error() {
        let error = parse_config_str("platforms:\n  - platform: VideoSite\n    tables:\n      - name: watch_history\n")
            .expect_err("table without title");
        let message = format!("{error:#}");
        assert!(message.contains("invalid `platforms` list"), "{message}");
        assert!(message.contains("title"), "{message}");

        let error = parse_config_str("VideoSite:\n  tables:\n    - title: T\n").expect_err("table without name");
        let message = format!("{error:#}");
        assert!(message.contains("invalid platform map"), "{message}");
        assert!(message.contains("name"), "{message}");
    }

    #[test]
    fn visual_without_name_does_not_reject_the_config() {
        let config = parse_config_str(
            "YouTube:\n  tables:\n    - name: watch_history\n      title: T\n      visuals:\n        - title: Cloud\n          textColumn: title\n",
        )
        .expect("lenient visuals");
        assert_eq!(config.platforms[0].tables[0].visuals, vec![VisualSpec::Unsupported]);
    }

    #[test]
    fn reads_config_from_disk() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "YouTube:\n  tables: []\n").expect("write config");

        let config = parse_config_file(&path).expect("load config");
        assert_eq!(config.platforms[0].platform, "YouTube");

        let error = parse_config_file(temp_dir.path().join("missing.yml")).expect_err("missing file");
        assert!(error.to_string().contains("Failed to read donation config"));
    }
}
