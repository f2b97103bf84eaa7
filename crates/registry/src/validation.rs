//! Outcome of checking a submitted export file.

use serde::{Deserialize, Serialize};

/// Numeric validation outcome with a short description.
///
/// `id == 0` means the file is valid; every other id is a distinct failure
/// reason chosen by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    pub id: u32,
    pub description: String,
}

impl StatusCode {
    pub fn new(id: u32, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.id == 0
    }
}

/// Result of one `validate` call, consumed by the matching `extract` call.
///
/// Besides the status it carries what validation already learned about the
/// archive so extraction never has to re-validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: StatusCode,
    /// Export flavour the extractor recognized (language, file format, ...).
    pub category: Option<String>,
    /// In-archive member names discovered while validating.
    pub members: Vec<String>,
}

impl ValidationResult {
    pub fn valid(status: StatusCode, category: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            status,
            category: Some(category.into()),
            members,
        }
    }

    pub fn invalid(status: StatusCode) -> Self {
        Self {
            status,
            category: None,
            members: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    pub fn status_id(&self) -> u32 {
        self.status.id
    }
}
