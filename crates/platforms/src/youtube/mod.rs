//! YouTube (Google Takeout) export extractor.
//!
//! A Takeout archive is recognized by the names of the files it contains.
//! Four export flavours are known (JSON or HTML history, English or Dutch
//! account language); the flavour found during validation decides which
//! member each table function reads.

mod history;

use std::path::Path;

use anyhow::Result;
use donation_registry::{
    ExtractionError, FileInput, PlatformExtractor, StatusCode, TableExtractions, ValidationResult, extract_configured_tables,
    file_input_for,
};
use donation_types::{DataTable, ExtractedTable, PlatformConfig};
use donation_util::{basename, find_member, list_members, read_member_to_string};
use tracing::{debug, info, warn};

use history::{HistoryKind, parse_html_history, parse_json_history};

/// Registry name of the built-in YouTube extractor.
pub const PLATFORM: &str = "YouTube";

const ACCEPTED_TYPES: &str = "application/zip";

const STATUS_VALID: u32 = 0;
const STATUS_NOT_A_DDP: u32 = 1;
const STATUS_BAD_ZIPFILE: u32 = 2;

fn status(id: u32) -> StatusCode {
    let description = match id {
        STATUS_VALID => "Valid DDP",
        STATUS_NOT_A_DDP => "Not a valid DDP",
        _ => "Bad zipfile",
    };
    StatusCode::new(id, description)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryFormat {
    Json,
    Html,
}

/// One recognizable Takeout flavour.
#[derive(Debug)]
struct DdpCategory {
    id: &'static str,
    format: HistoryFormat,
    watch_history: &'static str,
    search_history: &'static str,
    known_files: &'static [&'static str],
}

const CATEGORIES: &[DdpCategory] = &[
    DdpCategory {
        id: "json_en",
        format: HistoryFormat::Json,
        watch_history: "watch-history.json",
        search_history: "search-history.json",
        known_files: &[
            "archive_browser.html",
            "watch-history.json",
            "search-history.json",
            "my-comments.html",
            "my-live-chat-messages.html",
            "subscriptions.csv",
            "comments.csv",
        ],
    },
    DdpCategory {
        id: "html_en",
        format: HistoryFormat::Html,
        watch_history: "watch-history.html",
        search_history: "search-history.html",
        known_files: &[
            "archive_browser.html",
            "watch-history.html",
            "search-history.html",
            "my-comments.html",
            "my-live-chat-messages.html",
            "subscriptions.csv",
            "comments.csv",
        ],
    },
    DdpCategory {
        id: "json_nl",
        format: HistoryFormat::Json,
        watch_history: "kijkgeschiedenis.json",
        search_history: "zoekgeschiedenis.json",
        known_files: &[
            "archive_browser.html",
            "kijkgeschiedenis.json",
            "zoekgeschiedenis.json",
            "mijn-reacties.html",
            "mijn-livechatberichten.html",
            "abonnementen.csv",
        ],
    },
    DdpCategory {
        id: "html_nl",
        format: HistoryFormat::Html,
        watch_history: "kijkgeschiedenis.html",
        search_history: "zoekgeschiedenis.html",
        known_files: &[
            "archive_browser.html",
            "kijkgeschiedenis.html",
            "zoekgeschiedenis.html",
            "mijn-reacties.html",
            "mijn-livechatberichten.html",
            "abonnementen.csv",
        ],
    },
];

/// Picks the category whose known files best match the archive; ties go to
/// the earlier category. `None` when no known file is present.
fn infer_category(members: &[String]) -> Option<&'static DdpCategory> {
    let mut best: Option<(&'static DdpCategory, usize)> = None;
    for category in CATEGORIES {
        let matches = category
            .known_files
            .iter()
            .filter(|known| members.iter().any(|member| basename(member).eq_ignore_ascii_case(known)))
            .count();
        if matches > 0 && best.is_none_or(|(_, score)| matches > score) {
            best = Some((category, matches));
        }
    }
    best.map(|(category, _)| category)
}

fn category_by_id(id: Option<&str>) -> Option<&'static DdpCategory> {
    let id = id?;
    CATEGORIES.iter().find(|category| category.id == id)
}

/// Validates Google Takeout archives and extracts watch and search history.
pub struct YouTubeExtractor {
    config: PlatformConfig,
    extractions: TableExtractions,
}

impl YouTubeExtractor {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            extractions: TableExtractions::new()
                .with("watch_history", watch_history_to_table)
                .with("search_history", search_history_to_table),
        }
    }
}

impl PlatformExtractor for YouTubeExtractor {
    fn platform(&self) -> &str {
        &self.config.platform
    }

    fn file_input(&self) -> FileInput {
        file_input_for(&self.config.platform, ACCEPTED_TYPES)
    }

    fn validate(&self, file: &Path) -> ValidationResult {
        let members = match list_members(file) {
            Ok(members) => members,
            Err(error) => {
                warn!(platform = %self.config.platform, error = %error, "submitted file is not a readable zip");
                return ValidationResult::invalid(status(STATUS_BAD_ZIPFILE));
            }
        };

        match infer_category(&members) {
            Some(category) => {
                info!(platform = %self.config.platform, category = category.id, members = members.len(), "recognized export");
                ValidationResult::valid(status(STATUS_VALID), category.id, members)
            }
            None => {
                info!(platform = %self.config.platform, members = members.len(), "archive does not look like a YouTube export");
                ValidationResult::invalid(status(STATUS_NOT_A_DDP))
            }
        }
    }

    fn extract(&self, file: &Path, validation: ValidationResult) -> Result<Vec<ExtractedTable>, ExtractionError> {
        extract_configured_tables(&self.config, &self.extractions, file, &validation)
    }
}

fn watch_history_to_table(file: &Path, validation: &ValidationResult) -> Result<DataTable> {
    history_to_table(file, validation, HistoryKind::Watch)
}

fn search_history_to_table(file: &Path, validation: &ValidationResult) -> Result<DataTable> {
    history_to_table(file, validation, HistoryKind::Search)
}

fn history_to_table(file: &Path, validation: &ValidationResult, kind: HistoryKind) -> Result<DataTable> {
    let Some(category) = category_by_id(validation.category.as_deref()) else {
        return Ok(kind.empty_table());
    };
    let file_name = match kind {
        HistoryKind::Watch => category.watch_history,
        HistoryKind::Search => category.search_history,
    };
    let Some(member) = find_member(&validation.members, file_name) else {
        debug!(member = file_name, "history file not present in export");
        return Ok(kind.empty_table());
    };

    let content = read_member_to_string(file, member)?;
    match category.format {
        HistoryFormat::Json => parse_json_history(&content, kind),
        HistoryFormat::Html => Ok(parse_html_history(&content, kind)),
    }
}
