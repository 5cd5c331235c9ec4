pub mod campaign;
pub mod filter;

use std::path::PathBuf;

use anyhow::Result;
use scoutline_instagram::Summary;

use crate::config::Config;

/// Settings shared by both workflows after CLI overrides
pub struct RunSettings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub max_followers: u64,
    pub batch_size: Option<usize>,
    pub numbered: bool,
    pub timeout: Option<u64>,
}

impl RunSettings {
    /// Assemble the pipeline config from file config + overrides
    pub fn pipeline(self, config: &Config) -> Result<scoutline_instagram::Config> {
        Ok(scoutline_instagram::Config {
            input: self.input,
            output: self.output,
            numbered: self.numbered || config.output.numbered,
            columns: config.input.columns(),
            max_followers: self.max_followers,
            batch_size: self.batch_size,
            graph: config.instagram.graph(self.timeout)?,
        })
    }
}

/// Final line pointing at the surviving output
pub fn report(summary: &Summary) {
    if let Some(path) = &summary.last_output {
        eprintln!(
            "Kept {} of {} accounts, last batch in {}",
            summary.accepted,
            summary.total_rows,
            path.display()
        );
    }
}
