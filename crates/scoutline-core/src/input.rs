//! Candidate list loading from delimited text or spreadsheets

use std::path::{Path, PathBuf};

use calamine::{Data, Reader};

use crate::error::LoadError;
use crate::record::InputRow;

/// Header names for the identifier and contact columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputColumns {
    pub id: String,
    pub email: String,
}

impl Default for InputColumns {
    fn default() -> Self {
        Self {
            id: "user_id".to_string(),
            email: "email".to_string(),
        }
    }
}

/// Tabular formats understood by [`load_rows`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-delimited (`.csv`)
    Csv,
    /// Tab-delimited (`.tsv`, `.txt`)
    Tsv,
    /// Native workbook (`.xlsx`, `.xls`), first worksheet
    Spreadsheet,
}

impl InputFormat {
    /// Pick a parser from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("tsv" | "txt") => Ok(Self::Tsv),
            Some("xlsx" | "xls") => Ok(Self::Spreadsheet),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Rows read from the input, in file order
#[derive(Debug, Default)]
pub struct InputTable {
    pub rows: Vec<InputRow>,
    /// Whether the email column exists in the header
    pub has_email_column: bool,
}

impl InputTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load candidate rows from `path`, dispatching on its extension.
///
/// The first row is the header. The id column is required; the email column
/// is optional here and checked by workflows that need it.
pub fn load_rows(path: &Path, columns: &InputColumns) -> Result<InputTable, LoadError> {
    let format = InputFormat::from_path(path)?;
    log::debug!("Loading {} as {format:?}", path.display());
    let table = match format {
        InputFormat::Csv => load_delimited(path, b',', columns)?,
        InputFormat::Tsv => load_delimited(path, b'\t', columns)?,
        InputFormat::Spreadsheet => load_spreadsheet(path, columns)?,
    };
    log::info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Column positions resolved from the header
struct HeaderIndex {
    id: usize,
    email: Option<usize>,
}

impl HeaderIndex {
    fn resolve(header: &[String], columns: &InputColumns, path: &Path) -> Result<Self, LoadError> {
        let find = |name: &str| {
            header.iter().position(|h| {
                h.trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(name)
            })
        };
        let id = find(&columns.id).ok_or_else(|| LoadError::MissingColumn {
            column: columns.id.clone(),
            path: PathBuf::from(path),
        })?;
        Ok(Self {
            id,
            email: find(&columns.email),
        })
    }

    /// Build an [`InputRow`], or `None` when the id cell is blank
    fn row(&self, line: usize, mut cell: impl FnMut(usize) -> Option<String>) -> Option<InputRow> {
        let Some(user_id) = cell(self.id).filter(|s| !s.is_empty()) else {
            log::warn!("Row {line}: empty identifier, skipping");
            return None;
        };
        let email = self.email.and_then(&mut cell).filter(|s| !s.is_empty());
        Some(InputRow {
            line,
            user_id,
            email,
        })
    }
}

fn load_delimited(
    path: &Path,
    delimiter: u8,
    columns: &InputColumns,
) -> Result<InputTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let index = HeaderIndex::resolve(&header, columns, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let cell = |idx: usize| record.get(idx).map(|s| s.trim().to_string());
        rows.extend(index.row(line, cell));
    }
    Ok(InputTable {
        rows,
        has_email_column: index.email.is_some(),
    })
}

fn load_spreadsheet(path: &Path, columns: &InputColumns) -> Result<InputTable, LoadError> {
    let mut workbook =
        calamine::open_workbook_auto(path).map_err(|e| LoadError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Spreadsheet(format!("no worksheet in {}", path.display())))?
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    // header sits on the first used row; sheet rows are 1-based
    let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut sheet_rows = range.rows();
    let header: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();
    let index = HeaderIndex::resolve(&header, columns, path)?;

    let mut rows = Vec::new();
    for (i, cells) in sheet_rows.enumerate() {
        let cell = |idx: usize| cells.get(idx).and_then(cell_text);
        rows.extend(index.row(header_row + 1 + i, cell));
    }
    Ok(InputTable {
        rows,
        has_email_column: index.email.is_some(),
    })
}

/// Render a worksheet cell as text; whole floats lose their `.0`
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    };
    Some(text)
}
