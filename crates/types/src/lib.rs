//! Shared type definitions for the data donation port.
//!
//! The models here are consumed by the extractor registry, the workflow
//! engine, and whatever presentation layer renders prompts for participants.
//! Configuration types preserve authoring order so tables are extracted and
//! displayed in the sequence the researcher wrote them.

pub mod config;
pub mod protocol;
pub mod table;
pub mod text;

pub use config::{DonationConfig, PlatformConfig, TableSpec, VisualSpec};
pub use protocol::{Command, ConfirmPrompt, ConsentFormPrompt, ConsentTable, DonationPage, FileInputPrompt, Page, Payload, Prompt};
pub use table::{DataTable, ExtractedTable, Visualization, VisualizationKind, WordcloudVisualization};
pub use text::Translatable;
