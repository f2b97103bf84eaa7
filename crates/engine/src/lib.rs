//! # Donation Engine
//!
//! Runs the participant-facing data donation workflow: for each configured
//! platform, ask for an export file, validate it, extract the configured
//! tables, ask for consent, and donate what the participant approved.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use donation_engine::{DonationFlow, parse_config_str};
//! use donation_registry::ExtractorRegistry;
//! use donation_types::Payload;
//! use donation_util::SessionLog;
//!
//! let config = parse_config_str("platforms: []")?;
//! let mut flow = DonationFlow::new(Arc::new(ExtractorRegistry::new()), config, SessionLog::default());
//!
//! let commands = flow.start()?;
//! assert!(flow.is_finished());
//! assert_eq!(commands.len(), 2);
//! assert!(flow.resume(Payload::Void).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`config`**: loading the YAML/JSON donation configuration
//! - **`flow`**: the [`DonationFlow`] state machine
//! - **`prompts`**: builders for the commands sent to the presentation layer
//! - **`session`**: [`drive_session`], an async trampoline over channels

pub mod config;
pub mod error;
pub mod flow;
pub mod prompts;
pub mod session;

pub use config::{parse_config_file, parse_config_str};
pub use error::{ConfigError, FlowError};
pub use flow::{DonationFlow, FlowOptions, FlowPhase, FlowTransition};
pub use session::{SessionSummary, drive_session};
