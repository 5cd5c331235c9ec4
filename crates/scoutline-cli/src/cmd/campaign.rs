//! Campaign subcommand - fetch, filter, email, save in batches

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use scoutline_core::{Notifier, ProgressContext};
use scoutline_mail::{DryRunNotifier, SmtpNotifier};

use super::RunSettings;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct CampaignArgs {
    /// Candidate list with id and email columns
    pub input: PathBuf,

    /// Output file (.xlsx or .csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Drop accounts with more followers than this
    #[arg(short, long)]
    pub max_followers: Option<u64>,

    /// Flush every N input rows
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Email subject line
    #[arg(long)]
    pub subject: Option<String>,

    /// File holding the body template ({username} is substituted)
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Sender address
    #[arg(long)]
    pub from: Option<String>,

    /// Write each batch to its own numbered file
    #[arg(long)]
    pub numbered: bool,

    /// Log rendered emails instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(
    args: CampaignArgs,
    config: &Config,
    timeout: Option<u64>,
    progress: &ProgressContext,
) -> Result<()> {
    let template = config
        .mail
        .template(args.subject.as_deref(), args.body_file.as_deref())?;

    let notifier: Box<dyn Notifier> = if args.dry_run {
        let from = config.mail.sender(args.from.as_deref())?;
        Box::new(DryRunNotifier::new(&from, template).context("Invalid sender address")?)
    } else {
        let relay = config.mail.relay(args.from.as_deref())?;
        Box::new(SmtpNotifier::new(&relay, template).context("Failed to configure SMTP relay")?)
    };

    let settings = RunSettings {
        input: args.input,
        output: args.output.unwrap_or_else(|| config.campaign.output.clone()),
        max_followers: args.max_followers.unwrap_or(config.filter.max_followers),
        batch_size: Some(args.batch_size.unwrap_or(config.campaign.batch_size)),
        numbered: args.numbered,
        timeout,
    };
    let pipeline = settings.pipeline(config)?;
    let summary = scoutline_instagram::run(&pipeline, Some(notifier.as_ref()), progress)?;
    super::report(&summary);
    Ok(())
}
