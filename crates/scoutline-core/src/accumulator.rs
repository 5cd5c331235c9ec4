//! In-flight batch buffer and the row-driven flush loop

use crate::record::AccountRecord;

/// Default number of processed input rows between flushes
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Buffers accepted records until a flush is due.
///
/// Flushes are counted in processed input rows, not accepted records, so a
/// batch whose rows were all filtered out still produces a (empty) flush.
#[derive(Debug)]
pub struct BatchAccumulator {
    batch: Vec<AccountRecord>,
    batch_size: Option<usize>,
    rows_since_flush: usize,
}

impl BatchAccumulator {
    /// `None` holds everything until end-of-input
    pub fn new(batch_size: Option<usize>) -> Self {
        let batch_size = batch_size.map(|n| n.max(1));
        Self {
            batch: Vec::with_capacity(batch_size.unwrap_or(0).min(4096)),
            batch_size,
            rows_since_flush: 0,
        }
    }

    /// Append an accepted record to the in-flight batch
    pub fn push(&mut self, record: AccountRecord) {
        self.batch.push(record);
    }

    /// Number of records currently buffered
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Mark one input row as processed; returns true when a flush is due
    pub fn row_done(&mut self) -> bool {
        self.rows_since_flush += 1;
        self.batch_size
            .is_some_and(|size| self.rows_since_flush >= size)
    }

    /// Rows processed since the last flush
    pub fn has_pending_rows(&self) -> bool {
        self.rows_since_flush > 0
    }

    /// Take buffered records, resetting the row counter
    pub fn take_batch(&mut self) -> Vec<AccountRecord> {
        self.rows_since_flush = 0;
        std::mem::take(&mut self.batch)
    }
}

/// Statistics from driving rows through an accumulator
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub rows_processed: usize,
    pub records_written: usize,
    pub flushes: usize,
}

/// Feed rows through `handle`, buffering accepted records and flushing them.
///
/// The caller provides:
/// - `handle`: per-row work returning `Some(record)` to keep
/// - `write_batch`: sink callback, invoked every `batch_size` rows and once
///   more at end-of-input if rows are pending (or if nothing was flushed yet)
pub fn process_rows<T>(
    rows: impl IntoIterator<Item = T>,
    acc: &mut BatchAccumulator,
    mut handle: impl FnMut(T) -> Option<AccountRecord>,
    mut write_batch: impl FnMut(&[AccountRecord]) -> std::io::Result<()>,
) -> std::io::Result<BatchStats> {
    let mut stats = BatchStats::default();

    let mut flush = |acc: &mut BatchAccumulator, stats: &mut BatchStats| {
        let batch = acc.take_batch();
        write_batch(&batch)?;
        stats.records_written += batch.len();
        stats.flushes += 1;
        log::debug!(
            "Flushed batch {} ({} records, {} rows processed)",
            stats.flushes,
            batch.len(),
            stats.rows_processed
        );
        Ok::<_, std::io::Error>(())
    };

    for row in rows {
        if let Some(record) = handle(row) {
            acc.push(record);
        }
        stats.rows_processed += 1;
        if acc.row_done() {
            flush(acc, &mut stats)?;
        }
    }
    if acc.has_pending_rows() || stats.flushes == 0 {
        flush(acc, &mut stats)?;
    }
    Ok(stats)
}
