//! Main runner: load → fetch → filter → notify → accumulate → flush

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use scoutline_core::{
    AccountRecord, BatchAccumulator, BatchWriter, FileSink, InputRow, LoadError, Notifier,
    NotifyError, ProgressContext, cleanup_tmp_files, fmt_num, load_rows, process_rows,
};

use crate::api::{FetchError, GraphClient, ProfileSource};
use crate::config::Config;

/// What happened to the contact step for an accepted account
#[derive(Debug)]
pub enum Contact {
    /// Filter workflow: no notifier configured
    NotRequested,
    Sent,
    Failed(NotifyError),
    /// Row carried no email; notifier not called
    MissingEmail,
}

/// Result of processing one input row
#[derive(Debug)]
pub enum RowOutcome {
    FetchFailed(FetchError),
    /// Above the follower ceiling
    Filtered { followers_count: u64 },
    Accepted(Contact),
}

/// Pipeline execution summary
#[derive(Debug, Default)]
pub struct Summary {
    pub total_rows: usize,
    pub fetched: usize,
    pub fetch_failed: usize,
    pub filtered_out: usize,
    pub accepted: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub missing_email: usize,
    pub flushes: usize,
    /// File written by the last flush
    pub last_output: Option<PathBuf>,
    pub elapsed: Duration,
}

impl Summary {
    fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::FetchFailed(_) => self.fetch_failed += 1,
            RowOutcome::Filtered { .. } => {
                self.fetched += 1;
                self.filtered_out += 1;
            }
            RowOutcome::Accepted(contact) => {
                self.fetched += 1;
                self.accepted += 1;
                match contact {
                    Contact::NotRequested => {}
                    Contact::Sent => self.emails_sent += 1,
                    Contact::Failed(_) => self.emails_failed += 1,
                    Contact::MissingEmail => self.missing_email += 1,
                }
            }
        }
    }

    fn log(&self) {
        log::info!("=== Pipeline Summary ===");
        log::info!(
            "Rows: {} ({} fetched, {} failed)",
            fmt_num(self.total_rows),
            fmt_num(self.fetched),
            fmt_num(self.fetch_failed)
        );
        log::info!(
            "Accepted: {} ({} over follower ceiling)",
            fmt_num(self.accepted),
            fmt_num(self.filtered_out)
        );
        if self.emails_sent + self.emails_failed + self.missing_email > 0 {
            log::info!(
                "Emails: {} sent, {} failed, {} without address",
                self.emails_sent,
                self.emails_failed,
                self.missing_email
            );
        }
        log::info!("Flushes: {}", self.flushes);
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Fetch, filter and (optionally) contact one account.
///
/// Returns the record to keep, if any, plus the outcome for reporting.
pub fn process_row(
    row: &InputRow,
    source: &dyn ProfileSource,
    max_followers: u64,
    notifier: Option<&dyn Notifier>,
) -> (Option<AccountRecord>, RowOutcome) {
    let record = match source.fetch(&row.user_id) {
        Ok(record) => record,
        Err(e) => {
            log::error!(
                "Row {}: error fetching data for user {}: {e}",
                row.line,
                row.user_id
            );
            return (None, RowOutcome::FetchFailed(e));
        }
    };

    if record.followers_count > max_followers {
        log::debug!(
            "Row {}: {} has {} followers, over ceiling {max_followers}",
            row.line,
            row.user_id,
            record.followers_count
        );
        let followers_count = record.followers_count;
        return (None, RowOutcome::Filtered { followers_count });
    }

    let contact = match notifier {
        None => Contact::NotRequested,
        Some(notifier) => match row.contact() {
            None => {
                log::warn!(
                    "Row {}: no email address provided for user {}",
                    row.line,
                    row.user_id
                );
                Contact::MissingEmail
            }
            Some(to) => match notifier.notify(to, &record.username) {
                Ok(()) => {
                    log::info!("Email sent to {to}");
                    Contact::Sent
                }
                Err(e) => {
                    log::error!("Row {}: failed to send email to {to}: {e}", row.line);
                    Contact::Failed(e)
                }
            },
        },
    };

    (Some(record), RowOutcome::Accepted(contact))
}

/// Run the pipeline against the Graph API, writing to `config.output`.
///
/// With a notifier this is the campaign workflow (email column required);
/// without one it only filters and saves.
pub fn run(
    config: &Config,
    notifier: Option<&dyn Notifier>,
    progress: &ProgressContext,
) -> Result<Summary> {
    let client = GraphClient::new(&config.graph).context("Failed to build HTTP client")?;
    cleanup_tmp_files(&config.output).context("Failed to clean stale tmp files")?;
    let mut sink = FileSink::new(&config.output, config.numbered)?;
    run_with(config, &client, notifier, &mut sink, progress)
}

/// Run the pipeline with explicit fetcher and writer
pub fn run_with(
    config: &Config,
    source: &dyn ProfileSource,
    notifier: Option<&dyn Notifier>,
    writer: &mut dyn BatchWriter,
    progress: &ProgressContext,
) -> Result<Summary> {
    let start = Instant::now();

    let table = load_rows(&config.input, &config.columns)
        .with_context(|| format!("Failed to load {}", config.input.display()))?;
    if notifier.is_some() && !table.has_email_column {
        return Err(LoadError::MissingColumn {
            column: config.columns.email.clone(),
            path: config.input.clone(),
        })
        .context("Campaign workflow needs an email column");
    }

    let total = table.len();
    log::info!(
        "Processing {} accounts (max followers {}, batch size {})",
        fmt_num(total),
        fmt_num(config.max_followers as usize),
        config
            .batch_size
            .map_or_else(|| "all".to_string(), |n| n.to_string())
    );

    let pb = progress.rows_bar("accounts", total);
    let mut summary = Summary {
        total_rows: total,
        ..Default::default()
    };
    let mut last_output = None;
    let mut acc = BatchAccumulator::new(config.batch_size);

    let stats = process_rows(
        &table.rows,
        &mut acc,
        |row| {
            let (record, outcome) = process_row(row, source, config.max_followers, notifier);
            summary.record(&outcome);
            pb.inc(1);
            pb.set_message(format!(
                "{} kept, {} skipped",
                summary.accepted,
                summary.fetch_failed + summary.filtered_out
            ));
            record
        },
        |batch| {
            last_output = Some(writer.write_batch(batch)?);
            Ok(())
        },
    )
    .context("Failed to write output batch")?;
    pb.finish_and_clear();

    summary.flushes = stats.flushes;
    summary.last_output = last_output;
    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}
