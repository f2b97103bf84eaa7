use std::path::Path;

use donation_types::{ExtractedTable, Translatable};

use crate::{error::ExtractionError, validation::ValidationResult};

/// Instructions and file filter for the file-input prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    pub description: Translatable,
    /// MIME type or extension filter for the file picker.
    pub accepted_types: String,
}

/// Standard file-input instructions naming `platform`.
pub fn file_input_for(platform: &str, accepted_types: impl Into<String>) -> FileInput {
    let description = Translatable::new()
        .with(
            "en",
            format!(
                "Please follow the download instructions and choose the file that you stored on your device. \
                 Click “Skip” at the right bottom, if you do not have a file from {platform}."
            ),
        )
        .with(
            "nl",
            format!(
                "Volg de download instructies en kies het bestand dat je opgeslagen hebt op je apparaat. \
                 Als je geen {platform} bestand hebt klik dan op “Overslaan” rechts onder."
            ),
        );

    FileInput {
        description,
        accepted_types: accepted_types.into(),
    }
}

/// Per-platform validation and extraction.
///
/// Implementations are created by an [`ExtractorRegistry`](crate::ExtractorRegistry)
/// factory with the platform's configuration.
pub trait PlatformExtractor: Send + Sync {
    /// Registry name of the platform this extractor serves.
    fn platform(&self) -> &str;

    /// Prompt copy and accepted file types. Pure.
    fn file_input(&self) -> FileInput;

    /// Checks the submitted file. A wrong, unreadable, or corrupt file is
    /// reported through a nonzero status code, never as an error.
    fn validate(&self, file: &Path) -> ValidationResult;

    /// Extracts every configured table from a file that validated with status 0.
    ///
    /// Tables without rows are omitted; finding nothing is an empty list.
    /// Errors are reserved for configuration faults such as a table
    /// specification naming an extraction this platform does not provide.
    fn extract(&self, file: &Path, validation: ValidationResult) -> Result<Vec<ExtractedTable>, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_input_names_platform_in_every_locale() {
        let input = file_input_for("YouTube", "application/zip");
        assert_eq!(input.accepted_types, "application/zip");
        assert_eq!(input.description.translations.len(), 2);
        for text in input.description.translations.values() {
            assert!(text.contains("YouTube"));
        }
    }
}
