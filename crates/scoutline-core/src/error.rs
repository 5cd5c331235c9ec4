//! Input loading errors

use std::path::PathBuf;

/// Error from reading the candidate list. Always fatal for a run.
#[derive(Debug)]
pub enum LoadError {
    /// File extension is not one of csv / tsv / txt / xlsx / xls
    UnsupportedFormat(PathBuf),
    /// Required header column is absent
    MissingColumn { column: String, path: PathBuf },
    /// Delimited text could not be parsed
    Csv(csv::Error),
    /// Workbook could not be opened or has no worksheet
    Spreadsheet(String),
    Io(std::io::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(path) => write!(
                f,
                "unsupported file format: {} (use .csv, .tsv, .txt, .xlsx or .xls)",
                path.display()
            ),
            Self::MissingColumn { column, path } => {
                write!(f, "column '{column}' not found in {}", path.display())
            }
            Self::Csv(e) => write!(f, "CSV: {e}"),
            Self::Spreadsheet(msg) => write!(f, "spreadsheet: {msg}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
