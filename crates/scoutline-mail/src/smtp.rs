//! SMTP submission notifier (STARTTLS + username/password)

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use scoutline_core::{Notifier, NotifyError};

use crate::template::Template;

/// Relay connection and sender settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    /// Login name; the sender address when empty
    pub username: String,
    pub password: String,
    /// Sender address, `addr@host` or `Name <addr@host>`
    pub from: String,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl MailConfig {
    fn login(&self) -> &str {
        if self.username.is_empty() {
            &self.from
        } else {
            &self.username
        }
    }
}

fn parse_mailbox(addr: &str) -> Result<Mailbox, NotifyError> {
    addr.trim()
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::Address(format!("{addr}: {e}")))
}

/// Assemble a plain-text message
pub fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: String,
) -> Result<Message, NotifyError> {
    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| NotifyError::Message(e.to_string()))
}

/// Sends the rendered template through an authenticated relay
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    template: Template,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .field("subject", &self.template.subject)
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    /// Configure the relay. No connection is opened until the first send.
    pub fn new(config: &MailConfig, template: Template) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&config.from)?;
        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.login().to_string(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();
        log::debug!(
            "SMTP relay {}:{} as {}",
            config.host,
            config.port,
            config.login()
        );
        Ok(Self {
            transport,
            from,
            template,
        })
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, to: &str, username: &str) -> Result<(), NotifyError> {
        let message = build_message(
            &self.from,
            to,
            &self.template.subject,
            self.template.render(username),
        )?;
        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }
}

/// Renders and validates messages, logging them instead of sending
pub struct DryRunNotifier {
    from: Mailbox,
    template: Template,
}

impl DryRunNotifier {
    pub fn new(from: &str, template: Template) -> Result<Self, NotifyError> {
        Ok(Self {
            from: parse_mailbox(from)?,
            template,
        })
    }
}

impl Notifier for DryRunNotifier {
    fn notify(&self, to: &str, username: &str) -> Result<(), NotifyError> {
        let body = self.template.render(username);
        build_message(&self.from, to, &self.template.subject, body.clone())?;
        log::info!(
            "[dry-run] to={to} subject={:?}\n{body}",
            self.template.subject
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template {
            subject: "Collab".to_string(),
            body: "Hi {username}, let's talk.".to_string(),
        }
    }

    #[test]
    fn default_relay() {
        let config = MailConfig::default();
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, 587);
    }

    #[test]
    fn login_falls_back_to_sender() {
        let mut config = MailConfig {
            from: "me@example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.login(), "me@example.com");
        config.username = "relay-user".to_string();
        assert_eq!(config.login(), "relay-user");
    }

    #[test]
    fn message_has_headers_and_body() {
        let from = parse_mailbox("Brand <brand@example.com>").unwrap();
        let message = build_message(
            &from,
            "alice@example.com",
            "Collab",
            template().render("alice"),
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Collab"));
        assert!(raw.contains("To: alice@example.com"));
        assert!(raw.contains("brand@example.com"));
        assert!(raw.contains("Hi alice, let's talk."));
    }

    #[test]
    fn bad_recipient_is_address_error() {
        let from = parse_mailbox("brand@example.com").unwrap();
        let err = build_message(&from, "not an address", "s", String::new()).unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }

    #[test]
    fn notifier_requires_valid_sender() {
        let config = MailConfig {
            from: "nope".to_string(),
            ..Default::default()
        };
        let err = SmtpNotifier::new(&config, template()).unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }

    #[test]
    fn notifier_builds_without_connecting() {
        let config = MailConfig {
            host: "localhost".to_string(),
            port: 2525,
            from: "brand@example.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert!(SmtpNotifier::new(&config, template()).is_ok());
    }

    #[test]
    fn dry_run_validates_recipient() {
        let notifier = DryRunNotifier::new("brand@example.com", template()).unwrap();
        assert!(notifier.notify("alice@example.com", "alice").is_ok());
        assert!(matches!(
            notifier.notify("broken", "bob"),
            Err(NotifyError::Address(_))
        ));
    }
}
