//! Shared HTTP plumbing: a sync facade over async reqwest.
//!
//! Calls run on a small shared tokio runtime via `block_on`, so the pipeline
//! stays sequential while using the async client.

use std::sync::LazyLock;
use std::time::Duration;

/// HTTP timeouts applied to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Whole-request timeout (connect + headers + body)
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Build an async client with the given timeouts
pub fn http_client(config: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!("scoutline/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Run a future to completion on the shared runtime
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    SHARED_RUNTIME.handle().block_on(future)
}

/// Render a reqwest error without its URL.
///
/// Request URLs carry the access token as a query parameter.
pub fn redact(e: reqwest::Error) -> String {
    e.without_url().to_string()
}
