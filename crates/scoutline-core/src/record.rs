//! Account records and the engagement metric

use serde::Serialize;

/// Output column names, in write order.
pub const COLUMNS: [&str; 5] = [
    "id",
    "username",
    "followers_count",
    "media_count",
    "engagement_rate",
];

/// One row of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    /// 1-based line (sheet row for spreadsheets) in the source file
    pub line: usize,
    pub user_id: String,
    pub email: Option<String>,
}

impl InputRow {
    /// Contact email, if present and non-blank
    pub fn contact(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A fetched and enriched account, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    pub id: String,
    pub username: String,
    pub followers_count: u64,
    pub media_count: u64,
    pub engagement_rate: f64,
}

impl AccountRecord {
    /// Build a record, computing engagement from per-post interaction counts.
    pub fn new(
        id: String,
        username: String,
        followers_count: u64,
        media_count: u64,
        interactions: u64,
    ) -> Self {
        Self {
            id,
            username,
            followers_count,
            media_count,
            engagement_rate: engagement_rate(interactions, followers_count),
        }
    }
}

/// `100 * interactions / followers`, or 0 when there are no followers.
pub fn engagement_rate(interactions: u64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    interactions as f64 / followers as f64 * 100.0
}
