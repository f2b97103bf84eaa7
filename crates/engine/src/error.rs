use thiserror::Error;

/// Misuse of a [`DonationFlow`](crate::DonationFlow) or a broken bridge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("the donation flow has not been started")]
    NotStarted,
    #[error("the donation flow was already started")]
    AlreadyStarted,
    #[error("the donation flow has finished")]
    Finished,
    #[error("the donation flow was aborted by a configuration fault")]
    Aborted,
    #[error("the presentation bridge closed while the flow was waiting for an answer")]
    BridgeDisconnected,
}

/// Donation configuration documents that cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "unsupported donation config format; expected a `platforms` list of {{platform, tables}} entries \
         or a map from platform name to {{tables}}"
    )]
    UnsupportedFormat,
    #[error("platform entry {position} has an empty name")]
    BlankPlatform { position: usize },
}
