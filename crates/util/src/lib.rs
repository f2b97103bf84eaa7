//! Helpers shared by the extractors, the workflow engine, and the CLI.

pub mod archive;
pub mod log_sink;
pub mod paths;

pub use archive::{ArchiveError, basename, find_member, list_members, read_member, read_member_to_string};
pub use log_sink::{LogEntry, LogLevel, SessionLog};
pub use paths::{CONFIG_PATH_ENV, default_config_path, expand_tilde};
