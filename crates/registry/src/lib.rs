//! Platform extractor contract and the registry that creates extractors by name.
//!
//! The workflow engine only knows that a platform has a name and a
//! configuration. Everything platform specific (which files an export
//! contains, how to turn them into tables) lives behind
//! [`PlatformExtractor`], and new platforms are added by registering a
//! factory with an [`ExtractorRegistry`].

pub mod error;
pub mod extractor;
pub mod registry;
pub mod tables;
pub mod validation;

pub use error::{ExtractionError, RegistryError};
pub use extractor::{FileInput, PlatformExtractor, file_input_for};
pub use registry::{ExtractorFactory, ExtractorRegistry};
pub use tables::{TableExtractions, TableFn, build_visualization, extract_configured_tables, table_id};
pub use validation::{StatusCode, ValidationResult};
