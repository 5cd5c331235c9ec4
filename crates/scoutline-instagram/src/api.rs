//! Instagram Graph API client - profile fields and recent media engagement

use std::fmt;

use scoutline_core::{AccountRecord, HttpConfig, block_on, http_client, redact};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;

/// Default Graph API host
pub const DEFAULT_BASE_URL: &str = "https://graph.instagram.com";

const PROFILE_FIELDS: &str = "id,username,followers_count,media_count";
const MEDIA_FIELDS: &str = "id,like_count,comments_count";

/// Maximum characters of an error body kept in [`FetchError::Http`]
const ERROR_BODY_LIMIT: usize = 200;

/// Why an account could not be fetched. The account is skipped, the run goes on.
#[derive(Debug)]
pub enum FetchError {
    /// Non-success response
    Http { status: u16, message: String },
    /// Connection, timeout or body read failure
    Network(String),
    /// Malformed JSON or missing profile field
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Network(msg) => write!(f, "network: {msg}"),
            Self::Parse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// HTTP status, when the provider answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Anything that can turn an account id into an enriched record
pub trait ProfileSource {
    fn fetch(&self, user_id: &str) -> Result<AccountRecord, FetchError>;
}

/// Profile endpoint payload
#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    username: String,
    followers_count: u64,
    media_count: u64,
}

/// Media endpoint payload; `data` may be absent
#[derive(Debug, Default, Deserialize)]
pub struct MediaPage {
    #[serde(default)]
    pub data: Option<Vec<MediaItem>>,
}

/// Per-post counts. Both are required; a post without them fails the account.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MediaItem {
    pub like_count: u64,
    pub comments_count: u64,
}

impl MediaPage {
    /// Sum of likes and comments over the page; 0 when `data` is missing
    pub fn total_interactions(&self) -> u64 {
        self.data
            .iter()
            .flatten()
            .map(|m| m.like_count.saturating_add(m.comments_count))
            .fold(0u64, u64::saturating_add)
    }
}

/// Connection settings for [`GraphClient`]
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub base_url: String,
    pub access_token: String,
    /// Page size for the media request; provider default when `None`
    pub media_limit: Option<u32>,
    pub http: HttpConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: String::new(),
            media_limit: None,
            http: HttpConfig::default(),
        }
    }
}

/// Blocking Graph API client
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    media_limit: Option<u32>,
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("media_limit", &self.media_limit)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    pub fn new(config: &GraphConfig) -> reqwest::Result<Self> {
        Ok(Self {
            http: http_client(&config.http)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            media_limit: config.media_limit,
        })
    }

    /// GET `{base}/{path}` with `fields` + token, decoding the JSON body
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &str,
        extra: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{path}", self.base_url);
        let body = block_on(async {
            let resp = self
                .http
                .get(&url)
                .query(&[("fields", fields), ("access_token", self.access_token.as_str())])
                .query(extra)
                .send()
                .await
                .map_err(|e| FetchError::Network(redact(e)))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(FetchError::Http {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }
            resp.text().await.map_err(|e| FetchError::Network(redact(e)))
        })?;

        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Fetch the recent-media page for an account
    pub fn fetch_media(&self, user_id: &str) -> Result<MediaPage, FetchError> {
        let extra: Vec<(&str, String)> = self
            .media_limit
            .map(|n| ("limit", n.to_string()))
            .into_iter()
            .collect();
        self.get_json(&format!("{user_id}/media"), MEDIA_FIELDS, &extra)
    }
}

impl ProfileSource for GraphClient {
    fn fetch(&self, user_id: &str) -> Result<AccountRecord, FetchError> {
        let profile: Profile = self.get_json(user_id, PROFILE_FIELDS, &[])?;
        let media = self.fetch_media(user_id)?;
        let interactions = media.total_interactions();
        log::debug!(
            "{user_id}: @{} followers={} interactions={interactions}",
            profile.username,
            profile.followers_count
        );
        Ok(AccountRecord::new(
            profile.id,
            profile.username,
            profile.followers_count,
            profile.media_count,
            interactions,
        ))
    }
}

/// Pull `error.message` out of a Graph API error body, else a truncated body
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Inner,
    }
    #[derive(Deserialize)]
    struct Inner {
        message: String,
    }

    if let Ok(env) = serde_json::from_str::<Envelope>(body) {
        return env.error.message;
    }
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Accept ids sent either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(u64),
    }
    match Id::deserialize(deserializer) {
        Ok(Id::Str(s)) => Ok(s),
        Ok(Id::Num(n)) => Ok(n.to_string()),
        Err(_) => Err(de::Error::custom("id must be a string or integer")),
    }
}
