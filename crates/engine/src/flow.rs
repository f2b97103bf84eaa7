//! The donation workflow as an explicit, resumable state machine.
//!
//! For every configured platform, in order, the flow asks for an export
//! file, validates it, extracts the configured tables, and asks for consent
//! before donating. Each question is a [`Command`] that suspends the flow;
//! the caller feeds the single answer back through [`DonationFlow::resume`].
//!
//! ```text
//! AWAIT_FILE ── file ──> VALIDATING ── status 0 ──> EXTRACTING ──> AWAIT_CONSENT
//!     │                      └── status != 0 ──> AWAIT_RETRY ── yes ──> AWAIT_FILE
//!     └── skip ──> NEXT_PLATFORM <── no ──┘        AWAIT_CONSENT ── yes ──> DONATE ──> NEXT_PLATFORM
//! ```

use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use donation_registry::{ExtractorRegistry, PlatformExtractor};
use donation_types::{Command, DonationConfig, Payload, PlatformConfig};
use donation_util::SessionLog;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{error::FlowError, prompts};

/// Observable position of the flow, recorded on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowPhase {
    AwaitFile,
    Validating,
    Extracting,
    AwaitRetry,
    AwaitConsent,
    Donate,
    NextPlatform,
    Done,
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowPhase::AwaitFile => "AWAIT_FILE",
            FlowPhase::Validating => "VALIDATING",
            FlowPhase::Extracting => "EXTRACTING",
            FlowPhase::AwaitRetry => "AWAIT_RETRY",
            FlowPhase::AwaitConsent => "AWAIT_CONSENT",
            FlowPhase::Donate => "DONATE",
            FlowPhase::NextPlatform => "NEXT_PLATFORM",
            FlowPhase::Done => "DONE",
        };
        f.write_str(label)
    }
}

/// One entry of the transition trail. `platform` is `None` for [`FlowPhase::Done`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTransition {
    pub platform: Option<String>,
    pub phase: FlowPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOptions {
    /// Prefix of the log donation key.
    pub session_id: String,
    /// Donate the session log as `"{session_id}-tracking"` before exiting.
    pub donate_logs: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            session_id: "session".to_string(),
            donate_logs: false,
        }
    }
}

enum FlowState {
    Idle,
    AwaitingFile {
        index: usize,
        extractor: Box<dyn PlatformExtractor>,
    },
    AwaitingRetry {
        index: usize,
        extractor: Box<dyn PlatformExtractor>,
    },
    AwaitingConsent {
        index: usize,
    },
    Finished,
    Aborted,
}

/// One participant session over an ordered list of platforms.
///
/// The flow never blocks on its own: [`start`](Self::start) and
/// [`resume`](Self::resume) run until the next suspension point and return
/// the commands emitted on the way. A configuration fault (unknown platform,
/// unknown table specification) aborts the flow; every later call fails with
/// [`FlowError::Aborted`].
pub struct DonationFlow {
    registry: Arc<ExtractorRegistry>,
    platforms: Vec<PlatformConfig>,
    options: FlowOptions,
    state: FlowState,
    trail: Vec<FlowTransition>,
    log: SessionLog,
    donations: usize,
}

impl fmt::Debug for DonationFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DonationFlow")
            .field("platforms", &self.platforms.iter().map(|entry| &entry.platform).collect::<Vec<_>>())
            .field("options", &self.options)
            .field("awaiting", &self.awaiting())
            .field("donations", &self.donations)
            .finish()
    }
}

impl DonationFlow {
    pub fn new(registry: Arc<ExtractorRegistry>, config: DonationConfig, log: SessionLog) -> Self {
        Self {
            registry,
            platforms: config.platforms,
            options: FlowOptions::default(),
            state: FlowState::Idle,
            trail: Vec::new(),
            log,
            donations: 0,
        }
    }

    pub fn with_options(mut self, options: FlowOptions) -> Self {
        self.options = options;
        self
    }

    /// Enters the first platform and returns the commands up to the first
    /// suspension (or the whole session when no platform is configured).
    pub fn start(&mut self) -> Result<Vec<Command>> {
        if !matches!(self.state, FlowState::Idle) {
            return Err(FlowError::AlreadyStarted.into());
        }
        info!(platforms = self.platforms.len(), session = %self.options.session_id, "starting donation flow");
        self.log.info(format!("Starting donation flow over {} platform(s)", self.platforms.len()));

        self.state = FlowState::Aborted;
        let mut commands = Vec::new();
        self.enter_platform(0, &mut commands)?;
        Ok(commands)
    }

    /// Feeds the answer to the pending prompt and runs to the next suspension.
    ///
    /// Answers that do not fit the pending prompt take the negative branch:
    /// skip the file, do not retry, decline consent.
    pub fn resume(&mut self, answer: Payload) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        match std::mem::replace(&mut self.state, FlowState::Aborted) {
            FlowState::Idle => {
                self.state = FlowState::Idle;
                return Err(FlowError::NotStarted.into());
            }
            FlowState::Finished => {
                self.state = FlowState::Finished;
                return Err(FlowError::Finished.into());
            }
            FlowState::Aborted => return Err(FlowError::Aborted.into()),
            FlowState::AwaitingFile { index, extractor } => self.on_file(index, extractor, answer, &mut commands)?,
            FlowState::AwaitingRetry { index, extractor } => self.on_retry(index, extractor, answer, &mut commands)?,
            FlowState::AwaitingConsent { index } => self.on_consent(index, answer, &mut commands)?,
        }
        Ok(commands)
    }

    /// The suspension point the flow is parked at, if any.
    pub fn awaiting(&self) -> Option<FlowPhase> {
        match self.state {
            FlowState::AwaitingFile { .. } => Some(FlowPhase::AwaitFile),
            FlowState::AwaitingRetry { .. } => Some(FlowPhase::AwaitRetry),
            FlowState::AwaitingConsent { .. } => Some(FlowPhase::AwaitConsent),
            FlowState::Idle | FlowState::Finished | FlowState::Aborted => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, FlowState::Finished)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, FlowState::Aborted)
    }

    /// Platform the flow is currently suspended on.
    pub fn current_platform(&self) -> Option<&str> {
        let index = match self.state {
            FlowState::AwaitingFile { index, .. } | FlowState::AwaitingRetry { index, .. } | FlowState::AwaitingConsent { index } => index,
            FlowState::Idle | FlowState::Finished | FlowState::Aborted => return None,
        };
        self.platforms.get(index).map(|entry| entry.platform.as_str())
    }

    pub fn transitions(&self) -> &[FlowTransition] {
        &self.trail
    }

    /// Number of platform donations emitted so far (log donations excluded).
    pub fn donations(&self) -> usize {
        self.donations
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    fn platform_name(&self, index: usize) -> String {
        self.platforms.get(index).map(|entry| entry.platform.clone()).unwrap_or_default()
    }

    fn record(&mut self, platform: Option<&str>, phase: FlowPhase) {
        debug!(platform = platform.unwrap_or("-"), phase = %phase, "flow transition");
        self.trail.push(FlowTransition {
            platform: platform.map(str::to_string),
            phase,
        });
    }

    fn enter_platform(&mut self, index: usize, commands: &mut Vec<Command>) -> Result<()> {
        let Some(config) = self.platforms.get(index) else {
            return self.finish(commands);
        };
        let platform = config.platform.clone();

        let extractor = match self.registry.create(&platform, config.clone()) {
            Ok(extractor) => extractor,
            Err(fault) => {
                error!(platform = %platform, error = %fault, "cannot process platform; aborting flow");
                self.log.error(format!("{platform}: {fault}"));
                return Err(fault).with_context(|| format!("failed to start platform {platform}"));
            }
        };

        self.prompt_file(index, extractor, commands);
        Ok(())
    }

    fn prompt_file(&mut self, index: usize, extractor: Box<dyn PlatformExtractor>, commands: &mut Vec<Command>) {
        let platform = self.platform_name(index);
        info!(platform = %platform, "prompting for export file");
        self.log.info(format!("Prompt for file for {platform}"));
        self.record(Some(&platform), FlowPhase::AwaitFile);

        commands.push(prompts::render_page(&platform, prompts::file_prompt(extractor.file_input())));
        self.state = FlowState::AwaitingFile { index, extractor };
    }

    fn on_file(&mut self, index: usize, extractor: Box<dyn PlatformExtractor>, answer: Payload, commands: &mut Vec<Command>) -> Result<()> {
        let platform = self.platform_name(index);
        let Some(file) = answer.submitted_file() else {
            info!(platform = %platform, "file submission skipped");
            self.log.info(format!("{platform}: skipped file submission"));
            return self.next_platform(index, commands);
        };

        self.record(Some(&platform), FlowPhase::Validating);
        let validation = extractor.validate(file);
        if !validation.is_valid() {
            warn!(platform = %platform, status = validation.status_id(), reason = %validation.status.description, "file failed validation");
            self.log.warn(format!(
                "{platform}: validation failed with status {} ({})",
                validation.status_id(),
                validation.status.description
            ));
            self.record(Some(&platform), FlowPhase::AwaitRetry);
            commands.push(prompts::render_page(&platform, prompts::retry_confirmation(&platform)));
            self.state = FlowState::AwaitingRetry { index, extractor };
            return Ok(());
        }

        self.log.info(format!("{platform}: valid file, category {}", validation.category.as_deref().unwrap_or("-")));
        self.record(Some(&platform), FlowPhase::Extracting);
        let tables = match extractor.extract(file, validation) {
            Ok(tables) => tables,
            Err(fault) => {
                error!(platform = %platform, error = %fault, "extraction failed; aborting flow");
                self.log.error(format!("{platform}: {fault}"));
                return Err(fault).with_context(|| format!("failed to extract tables for platform {platform}"));
            }
        };

        info!(platform = %platform, tables = tables.len(), "extracted tables; asking for consent");
        self.log.info(format!("{platform}: extracted {} table(s)", tables.len()));
        self.record(Some(&platform), FlowPhase::AwaitConsent);
        commands.push(prompts::render_page(&platform, prompts::consent_prompt(&platform, tables)));
        self.state = FlowState::AwaitingConsent { index };
        Ok(())
    }

    fn on_retry(&mut self, index: usize, extractor: Box<dyn PlatformExtractor>, answer: Payload, commands: &mut Vec<Command>) -> Result<()> {
        if answer.is_affirmative() {
            debug!(platform = %self.platform_name(index), "participant retries");
            self.prompt_file(index, extractor, commands);
            return Ok(());
        }
        self.log.info(format!("{}: continued without retrying", self.platform_name(index)));
        self.next_platform(index, commands)
    }

    fn on_consent(&mut self, index: usize, answer: Payload, commands: &mut Vec<Command>) -> Result<()> {
        let platform = self.platform_name(index);
        match answer.consent() {
            Some(consented) => {
                let json_string = serde_json::to_string(consented).context("failed to serialize consented data")?;
                info!(platform = %platform, bytes = json_string.len(), "donating consented data");
                self.log.info(format!("{platform}: donation consented"));
                self.record(Some(&platform), FlowPhase::Donate);
                commands.push(prompts::donate(platform.as_str(), json_string));
                self.donations += 1;
            }
            None => {
                info!(platform = %platform, "consent declined");
                self.log.info(format!("{platform}: consent declined"));
            }
        }
        self.next_platform(index, commands)
    }

    fn next_platform(&mut self, index: usize, commands: &mut Vec<Command>) -> Result<()> {
        let platform = self.platform_name(index);
        self.record(Some(&platform), FlowPhase::NextPlatform);
        self.enter_platform(index + 1, commands)
    }

    fn finish(&mut self, commands: &mut Vec<Command>) -> Result<()> {
        self.record(None, FlowPhase::Done);
        info!(donations = self.donations, "donation flow finished");
        self.log.info(format!("Session finished with {} donation(s)", self.donations));

        if self.options.donate_logs {
            let json_string = self.log.to_donation_json().context("failed to serialize session log")?;
            commands.push(prompts::donate(format!("{}-tracking", self.options.session_id), json_string));
        }
        commands.push(prompts::exit_success());
        commands.push(prompts::end_page());
        self.state = FlowState::Finished;
        Ok(())
    }
}
