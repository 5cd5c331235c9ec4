//! Scoutline Mail - templated outreach over SMTP submission

pub mod smtp;
pub mod template;

pub use smtp::{DryRunNotifier, MailConfig, SmtpNotifier, build_message};
pub use template::{DEFAULT_BODY, DEFAULT_SUBJECT, Template, USERNAME_PLACEHOLDER};
