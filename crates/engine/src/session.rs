//! Async trampoline that runs a [`DonationFlow`] against a presentation bridge.

use anyhow::Result;
use donation_types::{Command, Payload};
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::{
    error::FlowError,
    flow::{DonationFlow, FlowTransition},
};

/// What a completed session did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub donations: usize,
    pub transitions: Vec<FlowTransition>,
}

/// Drives `flow` to completion.
///
/// Every command is forwarded on `command_tx`; after a command that expects
/// an answer the trampoline waits for exactly one payload on `answer_rx`.
/// If either side of the bridge goes away before the flow has finished the
/// run ends with [`FlowError::BridgeDisconnected`].
pub async fn drive_session(
    mut flow: DonationFlow,
    command_tx: UnboundedSender<Command>,
    mut answer_rx: UnboundedReceiver<Payload>,
) -> Result<SessionSummary> {
    let mut commands = flow.start()?;
    loop {
        for command in commands {
            if command_tx.send(command).is_err() {
                warn!("command receiver dropped; ending session");
                return Err(FlowError::BridgeDisconnected.into());
            }
        }

        if flow.is_finished() {
            break;
        }

        let Some(answer) = answer_rx.recv().await else {
            warn!(platform = flow.current_platform().unwrap_or("-"), "answer channel closed while suspended");
            return Err(FlowError::BridgeDisconnected.into());
        };
        debug!(awaiting = ?flow.awaiting(), "resuming flow");
        commands = flow.resume(answer)?;
    }

    Ok(SessionSummary {
        session_id: flow.options().session_id.clone(),
        donations: flow.donations(),
        transitions: flow.transitions().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use donation_registry::{ExtractionError, ExtractorRegistry, FileInput, PlatformExtractor, StatusCode, ValidationResult, file_input_for};
    use donation_types::{DonationConfig, ExtractedTable, Page, PlatformConfig};
    use donation_util::SessionLog;
    use std::{path::Path, sync::Arc};
    use tokio::sync::mpsc::unbounded_channel;

    struct RejectingExtractor {
        config: PlatformConfig,
    }

    impl PlatformExtractor for RejectingExtractor {
        fn platform(&self) -> &str {
            &self.config.platform
        }

        fn file_input(&self) -> FileInput {
            file_input_for(&self.config.platform, "application/zip")
        }

        fn validate(&self, _file: &Path) -> ValidationResult {
            ValidationResult::invalid(StatusCode::new(1, "never valid"))
        }

        fn extract(&self, _file: &Path, _validation: ValidationResult) -> Result<Vec<ExtractedTable>, ExtractionError> {
            Ok(Vec::new())
        }
    }

    fn flow(platforms: &[&str]) -> DonationFlow {
        let mut registry = ExtractorRegistry::new();
        registry.register("VideoSite", |config| Box::new(RejectingExtractor { config }));
        let config = DonationConfig {
            platforms: platforms
                .iter()
                .map(|platform| PlatformConfig {
                    platform: (*platform).into(),
                    tables: Vec::new(),
                })
                .collect(),
        };
        DonationFlow::new(Arc::new(registry), config, SessionLog::default())
    }

    #[tokio::test]
    async fn answers_are_consumed_one_per_suspension() {
        let (command_tx, mut command_rx) = unbounded_channel();
        let (answer_tx, answer_rx) = unbounded_channel();
        answer_tx.send(Payload::file("export.zip")).expect("queue file");
        answer_tx.send(Payload::True).expect("queue retry");
        answer_tx.send(Payload::Void).expect("queue skip");

        let summary = drive_session(flow(&["VideoSite"]), command_tx, answer_rx)
            .await
            .expect("drive session");

        let mut commands = Vec::new();
        while let Ok(command) = command_rx.try_recv() {
            commands.push(command);
        }
        let prompts = commands.iter().filter(|command| command.expects_answer()).count();
        assert_eq!(prompts, 3);
        assert!(matches!(commands.last(), Some(Command::Render { page: Page::End })));
        assert_eq!(summary.donations, 0);
        assert_eq!(summary.session_id, "session");
    }

    #[tokio::test]
    async fn closed_answer_channel_is_a_disconnect() {
        let (command_tx, _command_rx) = unbounded_channel();
        let (answer_tx, answer_rx) = unbounded_channel::<Payload>();
        drop(answer_tx);

        let error = drive_session(flow(&["VideoSite"]), command_tx, answer_rx)
            .await
            .expect_err("bridge closed");
        assert_eq!(error.downcast_ref::<FlowError>(), Some(&FlowError::BridgeDisconnected));
    }

    #[tokio::test]
    async fn dropped_command_receiver_is_a_disconnect() {
        let (command_tx, command_rx) = unbounded_channel();
        drop(command_rx);
        let (answer_tx, answer_rx) = unbounded_channel();
        answer_tx.send(Payload::Void).expect("queue skip");

        let error = drive_session(flow(&["VideoSite"]), command_tx, answer_rx)
            .await
            .expect_err("nobody listening for commands");
        assert_eq!(error.downcast_ref::<FlowError>(), Some(&FlowError::BridgeDisconnected));
    }

    #[tokio::test]
    async fn empty_session_needs_no_answers() {
        let (command_tx, mut command_rx) = unbounded_channel();
        let (_answer_tx, answer_rx) = unbounded_channel();

        let summary = drive_session(flow(&[]), command_tx, answer_rx).await.expect("drive session");
        assert_eq!(summary.transitions.len(), 1);
        assert!(matches!(command_rx.try_recv(), Ok(Command::Exit { code: 0, .. })));
    }
}
