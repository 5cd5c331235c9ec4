//! Pipeline configuration

use std::path::PathBuf;

use scoutline_core::InputColumns;

use crate::api::GraphConfig;

/// Default follower ceiling for micro/nano influencers
pub const DEFAULT_MAX_FOLLOWERS: u64 = 100_000;

/// Runtime configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    /// Candidate list (csv / tsv / txt / xlsx / xls)
    pub input: PathBuf,
    /// Output file (.xlsx or .csv)
    pub output: PathBuf,
    /// Write each flush to its own numbered file instead of overwriting `output`
    pub numbered: bool,
    pub columns: InputColumns,
    /// Accounts above this follower count are dropped
    pub max_followers: u64,
    /// Input rows between flushes; `None` writes once at end-of-input
    pub batch_size: Option<usize>,
    pub graph: GraphConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("influencers_list.csv"),
            output: PathBuf::from("filtered_influencers.xlsx"),
            numbered: false,
            columns: InputColumns::default(),
            max_followers: DEFAULT_MAX_FOLLOWERS,
            batch_size: None,
            graph: GraphConfig::default(),
        }
    }
}
