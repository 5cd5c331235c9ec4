//! Output sinks - spreadsheet / CSV batch writers with atomic tmp→rename

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::record::{AccountRecord, COLUMNS};

/// Destination for flushed batches
pub trait BatchWriter {
    /// Serialize one batch, returning the file it landed in
    fn write_batch(&mut self, batch: &[AccountRecord]) -> io::Result<PathBuf>;
}

/// Output file format, picked from the output path extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "unsupported output format: {} (use .xlsx or .csv)",
                    path.display()
                ),
            )),
        }
    }
}

/// File writer for batches.
///
/// By default every flush overwrites `path`, so only the last batch survives
/// in that file. With `numbered`, flush N goes to `<stem>_<NNNN>.<ext>` instead.
pub struct FileSink {
    path: PathBuf,
    format: OutputFormat,
    numbered: bool,
    flushes: usize,
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .field("numbered", &self.numbered)
            .field("flushes", &self.flushes)
            .finish_non_exhaustive()
    }
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, numbered: bool) -> io::Result<Self> {
        let path = path.into();
        let format = OutputFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            numbered,
            flushes: 0,
        })
    }

    /// Number of batches written so far
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Path for the given 1-based flush number
    fn target_path(&self, flush: usize) -> PathBuf {
        if !self.numbered {
            return self.path.clone();
        }
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!("{stem}_{flush:04}.{ext}"))
    }
}

impl BatchWriter for FileSink {
    fn write_batch(&mut self, batch: &[AccountRecord]) -> io::Result<PathBuf> {
        let final_path = self.target_path(self.flushes + 1);
        if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = final_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        match self.format {
            OutputFormat::Xlsx => write_xlsx(&tmp_path, batch)?,
            OutputFormat::Csv => write_csv(&tmp_path, batch)?,
        }
        fs::rename(&tmp_path, &final_path)?;

        self.flushes += 1;
        log::info!(
            "Saved {} records to {}",
            batch.len(),
            final_path.display()
        );
        Ok(final_path)
    }
}

fn write_xlsx(path: &Path, batch: &[AccountRecord]) -> io::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet.write_string(0, col, name).map_err(io::Error::other)?;
    }
    for (i, record) in batch.iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "batch too large"))?;
        sheet
            .write_string(row, 0, record.id.as_str())
            .and_then(|s| s.write_string(row, 1, record.username.as_str()))
            .and_then(|s| s.write_number(row, 2, record.followers_count as f64))
            .and_then(|s| s.write_number(row, 3, record.media_count as f64))
            .and_then(|s| s.write_number(row, 4, record.engagement_rate))
            .map_err(io::Error::other)?;
    }

    workbook.save(path).map_err(io::Error::other)
}

fn write_csv(path: &Path, batch: &[AccountRecord]) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(io::Error::other)?;
    // explicit header so an empty batch still yields the column row
    writer.write_record(COLUMNS).map_err(io::Error::other)?;
    for record in batch {
        writer.serialize(record).map_err(io::Error::other)?;
    }
    writer.flush()
}

/// Whether `name` is a tmp file [`FileSink`] writes for `output`:
/// `<name>.<ext>.tmp`, or `<stem>_<NNNN>.<ext>.tmp` in numbered mode.
fn is_sink_tmp(name: &str, output: &Path) -> bool {
    let Some(final_name) = name.strip_suffix(".tmp") else {
        return false;
    };
    let (Some(file_name), Some(stem), Some(ext)) = (
        output.file_name().and_then(|n| n.to_str()),
        output.file_stem().and_then(|s| s.to_str()),
        output.extension().and_then(|e| e.to_str()),
    ) else {
        return false;
    };
    if final_name == file_name {
        return true;
    }
    final_name
        .strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(ext))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|n| n.len() >= 4 && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Remove stale .tmp files an interrupted run left for `output`
pub fn cleanup_tmp_files(output: &Path) -> io::Result<()> {
    let dir = match output.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir,
        None => Path::new("."),
    };
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_ours = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| is_sink_tmp(n, output));
        if is_ours && path.is_file() {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
