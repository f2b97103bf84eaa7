//! Tabular extraction output and the visualizations attached to it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::text::Translatable;

/// Column-oriented header plus row-major cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// Creates an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with nulls and long rows truncated
    /// so every row matches the header width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column` in the header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Iterates the cells of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().filter_map(move |row| row.get(index)))
    }

    /// Replaces the header positionally. Returns `false` (leaving the header
    /// untouched) when the number of names differs from the column count.
    pub fn rename_columns(&mut self, names: &[String]) -> bool {
        if names.len() != self.columns.len() {
            return false;
        }
        self.columns = names.to_vec();
        true
    }
}

/// A table materialized from one table specification during a workflow attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    /// Identifier of the form `<platform>_<table name>`.
    pub name: String,
    pub title: Translatable,
    pub description: Translatable,
    /// Extracted rows, with configured column names applied.
    pub data: DataTable,
    /// Resolved visualization descriptors in configuration order.
    pub visualizations: Vec<Visualization>,
}

/// Renderable visualization descriptor.
///
/// [`Visualization::Empty`] serializes as `{}` and is what unknown
/// visualization requests resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Visualization {
    Wordcloud(WordcloudVisualization),
    Empty {},
}

impl Visualization {
    pub fn is_empty(&self) -> bool {
        matches!(self, Visualization::Empty {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualizationKind {
    #[serde(rename = "wordcloud")]
    Wordcloud,
}

/// Word cloud over the text of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordcloudVisualization {
    #[serde(rename = "type")]
    pub kind: VisualizationKind,
    pub title: Translatable,
    /// Column whose cells feed the cloud.
    #[serde(rename = "textColumn")]
    pub text_column: String,
    /// Whether the renderer splits cells into words; cells are used whole when false.
    pub tokenize: bool,
}
