//! Scoutline Core - shared building blocks for influencer outreach pipelines
//!
//! Input loading, account records, the batch accumulator and output sinks,
//! the notifier seam, HTTP plumbing, logging and progress.

pub mod accumulator;
pub mod error;
pub mod input;
pub mod logging;
pub mod notify;
pub mod progress;
pub mod record;
pub mod sink;
pub mod stream;

// Re-exports for convenience
pub use accumulator::{BatchAccumulator, BatchStats, DEFAULT_BATCH_SIZE, process_rows};
pub use error::LoadError;
pub use input::{InputColumns, InputFormat, InputTable, load_rows};
pub use logging::{IndicatifLogger, init_logging};
pub use notify::{Notifier, NotifyError};
pub use progress::{ProgressContext, fmt_num};
pub use record::{AccountRecord, COLUMNS, InputRow, engagement_rate};
pub use sink::{BatchWriter, FileSink, OutputFormat, cleanup_tmp_files};
pub use stream::{HttpConfig, SHARED_RUNTIME, block_on, http_client, redact};
