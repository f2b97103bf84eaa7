//! Parsers for Takeout activity history (watch and search), JSON and HTML.

use anyhow::{Context, Result};
use chrono::DateTime;
use donation_types::DataTable;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

static CONTENT_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="content-cell[^"]*mdl-typography--body-1">(.*?)</div>"#).expect("valid content cell regex"));
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?s)<a href="([^"]*)">(.*?)</a>"#).expect("valid anchor regex"));
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

const WATCH_PREFIXES: &[&str] = &["Watched ", "Bekeken "];
const SEARCH_PREFIXES: &[&str] = &["Searched for ", "Gezocht naar "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HistoryKind {
    Watch,
    Search,
}

impl HistoryKind {
    pub(crate) fn empty_table(self) -> DataTable {
        match self {
            HistoryKind::Watch => DataTable::new(["title", "url", "channel", "date"]),
            HistoryKind::Search => DataTable::new(["query", "url", "date"]),
        }
    }

    fn prefixes(self) -> &'static [&'static str] {
        match self {
            HistoryKind::Watch => WATCH_PREFIXES,
            HistoryKind::Search => SEARCH_PREFIXES,
        }
    }

    fn row(self, title: String, url: Option<String>, channel: Option<String>, date: Option<String>) -> Vec<Value> {
        let title = strip_prefix(&title, self.prefixes());
        match self {
            HistoryKind::Watch => vec![json!(title), json!(url), json!(channel), json!(date)],
            HistoryKind::Search => vec![json!(title), json!(url), json!(date)],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActivityRecord {
    #[serde(default)]
    title: String,
    #[serde(rename = "titleUrl", default)]
    title_url: Option<String>,
    #[serde(default)]
    subtitles: Vec<Subtitle>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    details: Vec<Detail>,
}

#[derive(Debug, Deserialize)]
struct Subtitle {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Detail {
    #[serde(default)]
    name: String,
}

impl ActivityRecord {
    fn is_ad(&self) -> bool {
        self.details.iter().any(|detail| detail.name.contains("Google Ads"))
    }
}

pub(crate) fn parse_json_history(content: &str, kind: HistoryKind) -> Result<DataTable> {
    let records: Vec<ActivityRecord> = serde_json::from_str(content).context("history file is not a JSON activity list")?;

    let mut table = kind.empty_table();
    for record in records.into_iter().filter(|record| !record.is_ad()) {
        let channel = record.subtitles.into_iter().next().map(|subtitle| subtitle.name);
        let date = record.time.as_deref().map(normalize_timestamp);
        table.push_row(kind.row(record.title, record.title_url, channel, date));
    }
    Ok(table)
}

/// HTML exports only carry localized, free-form dates; they are kept verbatim.
pub(crate) fn parse_html_history(content: &str, kind: HistoryKind) -> DataTable {
    let mut table = kind.empty_table();
    for cell in CONTENT_CELL.captures_iter(content) {
        let body = &cell[1];
        let mut anchors = ANCHOR.captures_iter(body);
        let Some(primary) = anchors.next() else {
            continue;
        };
        let url = decode_entities(&primary[1]);
        let title = decode_entities(&primary[2]);
        let channel = match kind {
            HistoryKind::Watch => anchors.next().map(|anchor| decode_entities(&anchor[2])),
            HistoryKind::Search => None,
        };
        let date = LINE_BREAK
            .split(body)
            .filter(|segment| !segment.contains("<a "))
            .map(|segment| decode_entities(&TAG.replace_all(segment, "")))
            .filter(|segment| !segment.is_empty())
            .last();

        table.push_row(kind.row(title, Some(url), channel, date));
    }
    table
}

fn strip_prefix(title: &str, prefixes: &[&str]) -> String {
    let title = title.replace('\u{a0}', " ");
    prefixes
        .iter()
        .find_map(|prefix| title.strip_prefix(*prefix))
        .unwrap_or(&title)
        .trim()
        .to_string()
}

fn normalize_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}
