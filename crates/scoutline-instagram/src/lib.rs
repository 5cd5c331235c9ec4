//! Scoutline Instagram - follower-ceiling filter over the Instagram Graph API
//!
//! Loads a candidate list, fetches each profile and its recent media,
//! computes engagement, keeps accounts at or under the follower ceiling and
//! writes them out in batches. An optional [`scoutline_core::Notifier`]
//! turns the run into an outreach campaign.
//!
//! # Example
//!
//! ```ignore
//! use scoutline_instagram::{Config, run};
//!
//! let mut config = Config::default();
//! config.graph.access_token = std::env::var("SCOUTLINE_ACCESS_TOKEN")?;
//! config.batch_size = Some(500);
//!
//! let progress = scoutline_core::ProgressContext::new();
//! let summary = run(&config, None, &progress)?;
//! println!("Kept {} accounts", summary.accepted);
//! ```

pub mod api;
pub mod config;
pub mod runner;

// Re-exports
pub use api::{FetchError, GraphClient, GraphConfig, MediaItem, MediaPage, ProfileSource};
pub use config::{Config, DEFAULT_MAX_FOLLOWERS};
pub use runner::{Contact, RowOutcome, Summary, process_row, run, run_with};
