//! scoutline - find micro/nano influencers and reach out to them
//!
//! Reads a candidate list, enriches each account from the Instagram Graph
//! API, keeps those under a follower ceiling and saves them to a spreadsheet,
//! optionally emailing each one.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "scoutline")]
#[command(about = "Influencer discovery and outreach pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./scoutline.toml or ~/.config/scoutline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch accounts, keep those under the follower ceiling, save them
    Filter(cmd::filter::FilterArgs),
    /// Like filter, and email every kept account that has an address
    Campaign(cmd::campaign::CampaignArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = scoutline_core::ProgressContext::new();
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    scoutline_core::init_logging(cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Filter(args) => cmd::filter::run(args, &config, cli.timeout, &progress),
        Command::Campaign(args) => cmd::campaign::run(args, &config, cli.timeout, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            fn secret(value: &Option<String>) -> &'static str {
                if value.as_deref().is_some_and(|v| !v.is_empty()) {
                    "configured"
                } else {
                    "not set"
                }
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Columns",
                &format!(
                    "id={} email={}",
                    config.input.id_column, config.input.email_column
                ),
            ]);
            table.add_row(vec![
                "Filter output",
                &config.filter.output.display().to_string(),
            ]);
            table.add_row(vec![
                "Campaign output",
                &config.campaign.output.display().to_string(),
            ]);
            table.add_row(vec![
                "Numbered output",
                &config.output.numbered.to_string(),
            ]);
            table.add_row(vec![
                "Max followers",
                &scoutline_core::fmt_num(config.filter.max_followers as usize),
            ]);
            table.add_row(vec![
                "Batch size",
                &format!(
                    "filter: {}, campaign: {}",
                    config
                        .filter
                        .batch_size
                        .map_or_else(|| "all".to_string(), |n| n.to_string()),
                    config.campaign.batch_size
                ),
            ]);
            table.add_row(vec!["Graph API", &config.instagram.base_url]);
            table.add_row(vec![
                "Access token",
                secret(&config.instagram.token()),
            ]);
            table.add_row(vec![
                "HTTP timeout",
                &format!(
                    "{}s (connect {}s)",
                    cli.timeout.unwrap_or(config.instagram.timeout_secs),
                    config.instagram.connect_timeout_secs
                ),
            ]);
            table.add_row(vec![
                "SMTP relay",
                &format!("{}:{} (STARTTLS)", config.mail.host, config.mail.port),
            ]);
            table.add_row(vec![
                "Sender",
                config.mail.from.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec!["SMTP password", secret(&config.mail.smtp_password())]);
            table.add_row(vec!["Subject", &config.mail.subject]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
