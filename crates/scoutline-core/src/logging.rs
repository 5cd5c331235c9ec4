//! Logging setup: env_logger, routed above the progress bar on a TTY

use indicatif::MultiProgress;

/// Crates whose info output is noise during a run (connection pools, TLS)
const QUIET_DEPS: [&str; 3] = ["hyper_util", "reqwest", "lettre"];

/// Where a log line ends up; decides whether it gets ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Terminal,
    Plain,
}

impl LogTarget {
    /// `[LEVEL] message`, level padded to five columns
    fn render(self, level: log::Level, args: &std::fmt::Arguments<'_>) -> String {
        let label = format!("{:<5}", level.as_str());
        match self {
            LogTarget::Plain => format!("[{label}] {args}"),
            LogTarget::Terminal => {
                let color = match level {
                    log::Level::Error => 31,
                    log::Level::Warn => 33,
                    log::Level::Info => 32,
                    log::Level::Debug => 36,
                    log::Level::Trace => 35,
                };
                format!("[\x1b[{color}m{label}\x1b[0m] {args}")
            }
        }
    }
}

/// Logger that prints above the row progress bar instead of through it.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }
        let line = LogTarget::Terminal.render(record.level(), record.args());
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    QUIET_DEPS
        .iter()
        .fold(level.to_string(), |acc, dep| format!("{acc},{dep}=warn"))
}

/// Initialize logging; pass the progress `MultiProgress` when on a TTY.
///
/// Calling twice is a no-op.
pub fn init_logging(debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(default_filter(debug));
    let mut builder = env_logger::Builder::from_env(env);

    match multi {
        Some(multi) => {
            let logger = builder.build();
            let max_level = logger.filter();
            if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok()
            {
                log::set_max_level(max_level);
            }
        }
        None => {
            let _ = builder
                .format(|buf, record| {
                    let line = LogTarget::Plain.render(record.level(), record.args());
                    writeln!(buf, "{line}")
                })
                .try_init();
        }
    }
}
