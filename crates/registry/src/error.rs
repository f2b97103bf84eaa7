//! Configuration and programming faults raised by the registry and extractors.
//!
//! Problems with participant data never appear here; they travel as
//! validation status codes or empty tables instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no extractor registered for platform '{platform}'")]
    UnknownPlatform { platform: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("platform '{platform}' has no table extraction named '{table}'")]
    UnknownTableSpec { platform: String, table: String },

    #[error("table '{table}' declares {declared} columns but extraction produced {produced}")]
    ColumnCountMismatch {
        table: String,
        declared: usize,
        produced: usize,
    },
}
