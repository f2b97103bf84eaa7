//! JSON-lines presentation bridge over stdin and stdout.

use std::{
    io::{self, BufRead},
    thread,
};

use anyhow::{Context, Result};
use donation_types::{Command, Payload};
use tokio::{
    io::{AsyncWriteExt, stdout},
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// Decodes one answer line. Anything unreadable counts as [`Payload::Unknown`].
pub fn parse_answer_line(line: &str) -> Payload {
    match serde_json::from_str(line) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(error = %error, "unreadable answer; treating as unknown");
            Payload::Unknown
        }
    }
}

/// Reads answers from stdin on a plain thread until EOF or until the
/// session stops listening. Blank lines are ignored.
pub fn spawn_stdin_reader(answer_tx: UnboundedSender<Payload>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if answer_tx.send(parse_answer_line(&line)).is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
}

/// Writes each command as one JSON line on stdout until the session drops its sender.
pub fn spawn_stdout_writer(mut command_rx: UnboundedReceiver<Command>) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut out = stdout();
        while let Some(command) = command_rx.recv().await {
            let mut line = serde_json::to_vec(&command).context("failed to encode command")?;
            line.push(b'\n');
            out.write_all(&line).await.context("failed to write command")?;
            out.flush().await.context("failed to flush stdout")?;
        }
        Ok(())
    })
}
