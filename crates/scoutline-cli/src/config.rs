//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use scoutline_core::{DEFAULT_BATCH_SIZE, HttpConfig, InputColumns};
use scoutline_instagram::{DEFAULT_MAX_FOLLOWERS, GraphConfig};
use scoutline_mail::{DEFAULT_BODY, DEFAULT_SUBJECT, MailConfig, Template};
use serde::Deserialize;

/// Environment fallback for the Graph API token
pub const TOKEN_ENV: &str = "SCOUTLINE_ACCESS_TOKEN";
/// Environment fallback for the SMTP password
pub const SMTP_PASSWORD_ENV: &str = "SCOUTLINE_SMTP_PASSWORD";

/// Global configuration for scoutline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub filter: FilterConfig,
    pub campaign: CampaignConfig,
    pub instagram: InstagramConfig,
    pub mail: MailSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub id_column: String,
    pub email_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        let columns = InputColumns::default();
        Self {
            id_column: columns.id,
            email_column: columns.email,
        }
    }
}

impl InputConfig {
    pub fn columns(&self) -> InputColumns {
        InputColumns {
            id: self.id_column.clone(),
            email: self.email_column.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Write each flush to `<stem>_NNNN.<ext>` instead of overwriting
    pub numbered: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub output: PathBuf,
    pub max_followers: u64,
    /// Unset: one write at end-of-input
    pub batch_size: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("filtered_micro_nano_influencers.xlsx"),
            max_followers: DEFAULT_MAX_FOLLOWERS,
            batch_size: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub output: PathBuf,
    pub batch_size: usize,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("influencer_campaign_data.xlsx"),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub access_token: Option<String>,
    pub media_limit: Option<u32>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            base_url: scoutline_instagram::api::DEFAULT_BASE_URL.to_string(),
            access_token: None,
            media_limit: None,
            timeout_secs: http.timeout.as_secs(),
            connect_timeout_secs: http.connect_timeout.as_secs(),
        }
    }
}

impl InstagramConfig {
    /// Token from the file, else from `SCOUTLINE_ACCESS_TOKEN`
    pub fn token(&self) -> Option<String> {
        secret_or_env(self.access_token.as_deref(), TOKEN_ENV)
    }

    /// Graph client settings; fails when no token is configured
    pub fn graph(&self, timeout_override: Option<u64>) -> Result<GraphConfig> {
        let access_token = self
            .token()
            .with_context(|| format!("No access token: set instagram.access_token or {TOKEN_ENV}"))?;
        Ok(GraphConfig {
            base_url: self.base_url.clone(),
            access_token,
            media_limit: self.media_limit,
            http: HttpConfig {
                timeout: Duration::from_secs(timeout_override.unwrap_or(self.timeout_secs)),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailSection {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub password: Option<String>,
    pub from: Option<String>,
    pub subject: String,
    pub body: String,
    /// Read the body template from this file instead of `body`
    pub body_file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for MailSection {
    fn default() -> Self {
        let mail = MailConfig::default();
        Self {
            host: mail.host,
            port: mail.port,
            username: None,
            password: None,
            from: None,
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
            body_file: None,
            timeout_secs: mail.timeout.as_secs(),
        }
    }
}

impl MailSection {
    /// Password from the file, else from `SCOUTLINE_SMTP_PASSWORD`
    pub fn smtp_password(&self) -> Option<String> {
        secret_or_env(self.password.as_deref(), SMTP_PASSWORD_ENV)
    }

    /// Relay settings; sender and password must be configured
    pub fn relay(&self, from_override: Option<&str>) -> Result<MailConfig> {
        let from = self.sender(from_override)?;
        let password = self.smtp_password().with_context(|| {
            format!("No SMTP password: set mail.password or {SMTP_PASSWORD_ENV}")
        })?;
        Ok(MailConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone().unwrap_or_default(),
            password,
            from,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    /// Sender address from the override or `mail.from`
    pub fn sender(&self, from_override: Option<&str>) -> Result<String> {
        from_override
            .map(String::from)
            .or_else(|| self.from.clone())
            .filter(|f| !f.trim().is_empty())
            .context("No sender address: set mail.from or pass --from")
    }

    /// Subject + body, honoring overrides and `body_file`
    pub fn template(&self, subject: Option<&str>, body_file: Option<&Path>) -> Result<Template> {
        let body = match body_file.or(self.body_file.as_deref()) {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read body template: {}", path.display()))?,
            None => self.body.clone(),
        };
        Ok(Template {
            subject: subject.unwrap_or(&self.subject).to_string(),
            body,
        })
    }
}

/// Secret fields may be written as `${VAR}`; an unset VAR reads as absent
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| expand_env_var(&value)))
}

fn expand_env_var(value: &str) -> Option<String> {
    match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(name) => std::env::var(name).ok(),
        None => Some(value.to_string()),
    }
}

/// Non-empty `value`, else the non-empty contents of env var `fallback`
fn secret_or_env(value: Option<&str>, fallback: &str) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| std::env::var(fallback).ok().filter(|v| !v.is_empty()))
}

impl Config {
    /// `./scoutline.toml`, then the per-user config file, else defaults
    pub fn load() -> Result<Self> {
        let user_config = directories::ProjectDirs::from("", "", "scoutline")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        let found = std::iter::once(PathBuf::from("scoutline.toml"))
            .chain(user_config)
            .find(|path| path.is_file());

        match found {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
