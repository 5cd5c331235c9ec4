//! Outreach message template

/// Placeholder replaced with the account's username
pub const USERNAME_PLACEHOLDER: &str = "{username}";

pub const DEFAULT_SUBJECT: &str = "Collaboration Opportunity";

pub const DEFAULT_BODY: &str = "Hi {username},\n\nWe are interested in collaborating with you for an upcoming campaign. Let us know if you're interested!";

/// Subject line plus a body with a single `{username}` substitution point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub subject: String,
    pub body: String,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

impl Template {
    /// Body with every `{username}` replaced; other braces are left alone
    pub fn render(&self, username: &str) -> String {
        self.body.replace(USERNAME_PLACEHOLDER, username)
    }
}
