//! Filter subcommand - fetch, filter by follower ceiling, save

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use scoutline_core::ProgressContext;

use super::RunSettings;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Candidate list (.csv, .tsv, .txt, .xlsx, .xls)
    pub input: PathBuf,

    /// Output file (.xlsx or .csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Drop accounts with more followers than this
    #[arg(short, long)]
    pub max_followers: Option<u64>,

    /// Flush every N input rows (default: once at the end)
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Write each batch to its own numbered file
    #[arg(long)]
    pub numbered: bool,
}

pub fn run(
    args: FilterArgs,
    config: &Config,
    timeout: Option<u64>,
    progress: &ProgressContext,
) -> Result<()> {
    let settings = RunSettings {
        input: args.input,
        output: args.output.unwrap_or_else(|| config.filter.output.clone()),
        max_followers: args.max_followers.unwrap_or(config.filter.max_followers),
        batch_size: args.batch_size.or(config.filter.batch_size),
        numbered: args.numbered,
        timeout,
    };
    let pipeline = settings.pipeline(config)?;
    let summary = scoutline_instagram::run(&pipeline, None, progress)?;
    super::report(&summary);
    Ok(())
}
