//! Directives exchanged with the presentation layer.
//!
//! The workflow emits [`Command`]s; for the prompts among them the
//! presentation layer answers with exactly one [`Payload`]. Both sides are
//! tagged with `__type__` so they can travel as self-describing JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    table::{DataTable, Visualization},
    text::Translatable,
};

/// Directive emitted by the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Command {
    /// Render a page. Donation pages carry a prompt and suspend the workflow.
    #[serde(rename = "CommandUIRender")]
    Render { page: Page },
    /// Hand a serialized payload to the transport under `key`.
    #[serde(rename = "CommandSystemDonate")]
    Donate { key: String, json_string: String },
    /// Report the session outcome.
    #[serde(rename = "CommandSystemExit")]
    Exit { code: i32, info: String },
}

impl Command {
    /// True when the presentation layer must answer this command before the
    /// workflow can continue.
    pub fn expects_answer(&self) -> bool {
        matches!(self, Command::Render { page: Page::Donation(_) })
    }

    pub fn is_donation(&self) -> bool {
        matches!(self, Command::Donate { .. })
    }

    /// The prompt carried by a donation page, if any.
    pub fn prompt(&self) -> Option<&Prompt> {
        match self {
            Command::Render { page: Page::Donation(page) } => Some(&page.body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Page {
    #[serde(rename = "PropsUIPageDonation")]
    Donation(DonationPage),
    #[serde(rename = "PropsUIPageEnd")]
    End,
}

/// Page framing one prompt for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationPage {
    pub platform: String,
    pub header: Translatable,
    pub body: Prompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Prompt {
    #[serde(rename = "PropsUIPromptFileInput")]
    FileInput(FileInputPrompt),
    #[serde(rename = "PropsUIPromptConsentForm")]
    ConsentForm(ConsentFormPrompt),
    #[serde(rename = "PropsUIPromptConfirm")]
    Confirm(ConfirmPrompt),
}

/// Asks the participant to pick their export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInputPrompt {
    pub description: Translatable,
    /// File picker filter, for example `application/zip`.
    pub extensions: String,
}

/// Shows what will be shared and asks for consent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentFormPrompt {
    pub tables: Vec<ConsentTable>,
    #[serde(rename = "metaTables")]
    pub meta_tables: Vec<ConsentTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentTable {
    pub id: String,
    pub title: Translatable,
    #[serde(rename = "dataFrame")]
    pub data_frame: DataTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Translatable>,
    #[serde(default)]
    pub visualizations: Vec<Visualization>,
}

/// Yes/no confirmation; `ok` answers [`Payload::True`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub text: Translatable,
    pub ok: Translatable,
    pub cancel: Translatable,
}

/// Answer returned by the presentation layer for a prompt.
///
/// Any `__type__` this build does not recognize deserializes to
/// [`Payload::Unknown`], which every decision point treats as the negative
/// branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Payload {
    /// Path of the file the participant submitted.
    #[serde(rename = "PayloadFile", alias = "PayloadString")]
    File { value: PathBuf },
    #[serde(rename = "PayloadTrue")]
    True,
    #[serde(rename = "PayloadFalse")]
    False,
    /// Structured consent result (the tables/fields the participant approved).
    #[serde(rename = "PayloadJSON")]
    Json { value: Value },
    #[serde(rename = "PayloadVoid")]
    Void,
    #[serde(rename = "PayloadError")]
    Error {
        #[serde(default)]
        value: String,
    },
    #[serde(other)]
    Unknown,
}

impl Payload {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Payload::File { value: path.into() }
    }

    pub fn json(value: Value) -> Self {
        Payload::Json { value }
    }

    pub fn submitted_file(&self) -> Option<&Path> {
        match self {
            Payload::File { value } => Some(value.as_path()),
            _ => None,
        }
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(self, Payload::True)
    }

    pub fn consent(&self) -> Option<&Value> {
        match self {
            Payload::Json { value } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payloads_decode_by_type_tag() {
        let file: Payload = serde_json::from_value(json!({"__type__": "PayloadString", "value": "/tmp/takeout.zip"}))
            .expect("decode string payload");
        assert_eq!(file.submitted_file(), Some(Path::new("/tmp/takeout.zip")));

        let yes: Payload = serde_json::from_value(json!({"__type__": "PayloadTrue"})).expect("decode true");
        assert!(yes.is_affirmative());

        let consent: Payload = serde_json::from_value(json!({"__type__": "PayloadJSON", "value": [{"youtube_watch_history": []}]}))
            .expect("decode json payload");
        assert!(consent.consent().is_some());
    }

    #[test]
    fn unrecognized_payload_is_unknown_and_negative() {
        let payload: Payload = serde_json::from_value(json!({"__type__": "PayloadClosed", "reason": "dismissed"}))
            .expect("decode unknown payload");
        assert_eq!(payload, Payload::Unknown);
        assert!(!payload.is_affirmative());
        assert!(payload.submitted_file().is_none());
        assert!(payload.consent().is_none());
    }

    #[test]
    fn render_command_nests_tagged_page_and_prompt() {
        let command = Command::Render {
            page: Page::Donation(DonationPage {
                platform: "YouTube".into(),
                header: Translatable::from("YouTube"),
                body: Prompt::Confirm(ConfirmPrompt {
                    text: Translatable::from("Retry?"),
                    ok: Translatable::from("Try again"),
                    cancel: Translatable::from("Continue"),
                }),
            }),
        };
        assert!(command.expects_answer());

        let value = serde_json::to_value(&command).expect("serialize command");
        assert_eq!(value["__type__"], "CommandUIRender");
        assert_eq!(value["page"]["__type__"], "PropsUIPageDonation");
        assert_eq!(value["page"]["body"]["__type__"], "PropsUIPromptConfirm");

        let end = Command::Render { page: Page::End };
        assert!(!end.expects_answer());
        assert!(end.prompt().is_none());
    }
}
