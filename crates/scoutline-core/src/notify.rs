//! Outreach seam between the pipeline and a delivery channel

/// Per-recipient delivery failure. Never fatal for a run.
#[derive(Debug)]
pub enum NotifyError {
    /// Recipient or sender address could not be parsed
    Address(String),
    /// Message could not be assembled
    Message(String),
    /// Relay refused or connection failed
    Transport(String),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address(msg) => write!(f, "invalid address: {msg}"),
            Self::Message(msg) => write!(f, "message: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
        }
    }
}

impl std::error::Error for NotifyError {}

/// Sends one templated message per accepted account
pub trait Notifier {
    /// Deliver the message for `username` to `to`
    fn notify(&self, to: &str, username: &str) -> Result<(), NotifyError>;
}
