//! Turns a platform's table specifications into extracted tables.
//!
//! Extractors own a fixed name → function mapping ([`TableExtractions`]);
//! [`extract_configured_tables`] walks the configuration in order, runs the
//! named functions, applies configured column names and visualizations, and
//! drops tables that came back empty.

use std::path::Path;

use anyhow::Result;
use donation_types::{
    DataTable, ExtractedTable, PlatformConfig, TableSpec, VisualSpec, Visualization, VisualizationKind, WordcloudVisualization,
};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{error::ExtractionError, validation::ValidationResult};

/// Extracts one table from a validated file.
///
/// An `Err` means the participant's file did not contain readable data for
/// this table; it is logged and treated as "no rows".
pub type TableFn = fn(&Path, &ValidationResult) -> Result<DataTable>;

/// Fixed mapping of table names to extraction functions for one extractor.
#[derive(Debug, Clone, Default)]
pub struct TableExtractions {
    functions: IndexMap<&'static str, TableFn>,
}

impl TableExtractions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, function: TableFn) -> Self {
        self.functions.insert(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<TableFn> {
        self.functions.get(name).copied()
    }
}

/// Identifier of an extracted table: lowercase platform, underscore, table name.
pub fn table_id(platform: &str, table: &str) -> String {
    format!("{}_{}", platform.to_lowercase(), table)
}

/// Resolves a visualization request; unsupported kinds become [`Visualization::Empty`].
pub fn build_visualization(spec: &VisualSpec) -> Visualization {
    match spec {
        VisualSpec::Wordcloud { title, text_column } => Visualization::Wordcloud(WordcloudVisualization {
            kind: VisualizationKind::Wordcloud,
            title: title.clone(),
            text_column: text_column.clone(),
            tokenize: false,
        }),
        VisualSpec::Unsupported => Visualization::Empty {},
    }
}

/// Runs every configured table of `config` against `file`.
///
/// All table names are checked before any extraction runs, so a
/// configuration naming an unknown table fails without partial work.
pub fn extract_configured_tables(
    config: &PlatformConfig,
    extractions: &TableExtractions,
    file: &Path,
    validation: &ValidationResult,
) -> Result<Vec<ExtractedTable>, ExtractionError> {
    let planned = config
        .tables
        .iter()
        .map(|spec| {
            extractions
                .get(&spec.name)
                .map(|function| (spec, function))
                .ok_or_else(|| ExtractionError::UnknownTableSpec {
                    platform: config.platform.clone(),
                    table: spec.name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut tables = Vec::with_capacity(planned.len());
    for (spec, function) in planned {
        let data = match function(file, validation) {
            Ok(data) => data,
            Err(error) => {
                warn!(platform = %config.platform, table = %spec.name, error = %error, "table extraction failed; treating as empty");
                continue;
            }
        };

        if data.is_empty() {
            debug!(platform = %config.platform, table = %spec.name, "no rows extracted; omitting table");
            continue;
        }

        tables.push(materialize(&config.platform, spec, data)?);
    }

    Ok(tables)
}

fn materialize(platform: &str, spec: &TableSpec, mut data: DataTable) -> Result<ExtractedTable, ExtractionError> {
    if let Some(columns) = &spec.columns
        && !data.rename_columns(columns)
    {
        return Err(ExtractionError::ColumnCountMismatch {
            table: spec.name.clone(),
            declared: columns.len(),
            produced: data.columns.len(),
        });
    }

    for visual in &spec.visuals {
        if let VisualSpec::Wordcloud { text_column, .. } = visual
            && data.column_index(text_column).is_none()
        {
            warn!(platform = %platform, table = %spec.name, column = %text_column, "wordcloud column not in table");
        }
    }

    debug!(platform = %platform, table = %spec.name, rows = data.len(), "extracted table");
    Ok(ExtractedTable {
        name: table_id(platform, &spec.name),
        title: spec.title.clone(),
        description: spec.description.clone(),
        data,
        visualizations: spec.visuals.iter().map(build_visualization).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::StatusCode;
    use anyhow::bail;
    use donation_types::Translatable;
    use serde_json::json;

    fn three_rows(_file: &Path, _validation: &ValidationResult) -> Result<DataTable> {
        let mut table = DataTable::new(["title", "url", "channel"]);
        for index in 0..3 {
            table.push_row(vec![json!(format!("video {index}")), json!("https://example.com"), json!("channel")]);
        }
        Ok(table)
    }

    fn no_rows(_file: &Path, _validation: &ValidationResult) -> Result<DataTable> {
        Ok(DataTable::new(["query"]))
    }

    fn unreadable(_file: &Path, _validation: &ValidationResult) -> Result<DataTable> {
        bail!("malformed history file")
    }

    fn spec(name: &str) -> TableSpec {
        TableSpec {
            name: name.into(),
            title: Translatable::from("Title"),
            description: Translatable::from("Description"),
            columns: None,
            visuals: Vec::new(),
        }
    }

    fn extractions() -> TableExtractions {
        TableExtractions::new()
            .with("watch_history", three_rows)
            .with("search_history", no_rows)
            .with("comments", unreadable)
    }

    fn validation() -> ValidationResult {
        ValidationResult::valid(StatusCode::new(0, "Valid DDP"), "json_en", Vec::new())
    }

    #[test]
    fn builds_named_table_with_visuals() {
        let mut watch = spec("watch_history");
        watch.visuals = vec![
            VisualSpec::Wordcloud {
                title: Translatable::from("Titles"),
                text_column: "title".into(),
            },
            VisualSpec::Unsupported,
        ];
        let config = PlatformConfig {
            platform: "VideoSite".into(),
            tables: vec![watch],
        };

        let tables = extract_configured_tables(&config, &extractions(), Path::new("export.zip"), &validation()).expect("extract");

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.name, "videosite_watch_history");
        assert_eq!(table.data.len(), 3);
        assert!(matches!(&table.visualizations[0], Visualization::Wordcloud(cloud) if cloud.text_column == "title" && !cloud.tokenize));
        assert!(table.visualizations[1].is_empty());
    }

    #[test]
    fn wordcloud_over_missing_column_still_extracts() {
        let mut watch = spec("watch_history");
        watch.visuals = vec![VisualSpec::Wordcloud {
            title: Translatable::from("Likes"),
            text_column: "likes".into(),
        }];
        let config = PlatformConfig {
            platform: "VideoSite".into(),
            tables: vec![watch],
        };

        let tables = extract_configured_tables(&config, &extractions(), Path::new("export.zip"), &validation()).expect("extract");
        assert_eq!(tables[0].data.column_index("likes"), None);
        assert!(matches!(&tables[0].visualizations[0], Visualization::Wordcloud(cloud) if cloud.text_column == "likes"));
    }

    #[test]
    fn empty_and_unreadable_tables_are_omitted() {
        let config = PlatformConfig {
            platform: "VideoSite".into(),
            tables: vec![spec("search_history"), spec("comments"), spec("watch_history")],
        };

        let tables = extract_configured_tables(&config, &extractions(), Path::new("export.zip"), &validation()).expect("extract");
        let names: Vec<_> = tables.iter().map(|table| table.name.as_str()).collect();
        assert_eq!(names, vec!["videosite_watch_history"]);
    }

    #[test]
    fn unknown_table_spec_fails_before_extracting() {
        let config = PlatformConfig {
            platform: "VideoSite".into(),
            tables: vec![spec("watch_history"), spec("likes")],
        };

        let error = extract_configured_tables(&config, &extractions(), Path::new("export.zip"), &validation()).expect_err("unknown table");
        assert_eq!(
            error,
            ExtractionError::UnknownTableSpec {
                platform: "VideoSite".into(),
                table: "likes".into()
            }
        );
    }

    #[test]
    fn declared_columns_rename_positionally() {
        let mut watch = spec("watch_history");
        watch.columns = Some(vec!["Titel".into(), "Link".into(), "Kanaal".into()]);
        let config = PlatformConfig {
            platform: "VideoSite".into(),
            tables: vec![watch.clone()],
        };
        let tables = extract_configured_tables(&config, &extractions(), Path::new("export.zip"), &validation()).expect("extract");
        assert_eq!(tables[0].data.columns, vec!["Titel", "Link", "Kanaal"]);

        watch.columns = Some(vec!["Titel".into()]);
        let config = PlatformConfig {
            platform: "VideoSite".into(),
            tables: vec![watch],
        };
        let error = extract_configured_tables(&config, &extractions(), Path::new("export.zip"), &validation()).expect_err("mismatch");
        assert!(matches!(error, ExtractionError::ColumnCountMismatch { declared: 1, produced: 3, .. }));
    }
}
