//! Spreadsheet-backed storage for submitted rows.
//!
//! The form only ever needs five operations from the backing sheet: open it,
//! read every row (raw or header-keyed), and append one row. [`SheetStore`]
//! captures exactly that; [`crate::remote::HttpSheet`] talks to the hosted
//! spreadsheet service, [`CsvSheet`] keeps rows in a local file and
//! [`MemorySheet`] backs tests and demos.

use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Cell / Record
// ---------------------------------------------------------------------------

/// One value in a submitted row. Numbers are written as numbers so the
/// sheet can sum them; everything else is written verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(u64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n)
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Cell::Number(u64::from(n))
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// A data row keyed by the sheet's header row.
pub type Record = HashMap<String, String>;

/// Turn raw values into header-keyed records. The first row is the header;
/// short rows are padded with empty strings.
pub fn records_from_values(values: &[Vec<String>]) -> Vec<Record> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, key)| (key.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SheetStore
// ---------------------------------------------------------------------------

pub trait SheetStore: Send + Sync {
    /// Open the document and select the sheet, failing if either is
    /// unreachable. Used for the "network active" banner.
    fn check(&self) -> Result<()>;

    /// Every row including the header, as strings.
    fn read_all_values(&self) -> Result<Vec<Vec<String>>>;

    /// Every data row keyed by the header row.
    fn read_all_records(&self) -> Result<Vec<Record>> {
        Ok(records_from_values(&self.read_all_values()?))
    }

    fn append_row(&self, row: &[Cell]) -> Result<()>;

    /// Human-readable location for logs and CLI output.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// MemorySheet
// ---------------------------------------------------------------------------

/// In-process sheet. Can be switched offline to exercise the remote-failure
/// paths.
#[derive(Debug, Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
    offline: AtomicBool,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<String>>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SurveyError::NetworkFailure(
                "memory sheet is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl SheetStore for MemorySheet {
    fn check(&self) -> Result<()> {
        self.ensure_online()
    }

    fn read_all_values(&self) -> Result<Vec<Vec<String>>> {
        self.ensure_online()?;
        Ok(self.rows())
    }

    fn append_row(&self, row: &[Cell]) -> Result<()> {
        self.ensure_online()?;
        self.lock().push(row.iter().map(Cell::to_string).collect());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

// ---------------------------------------------------------------------------
// CsvSheet
// ---------------------------------------------------------------------------

/// Rows kept in a local CSV file, one line per submission.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetStore for CsvSheet {
    fn check(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(
                SurveyError::MissingResource(format!("directory {}", parent.display())),
            ),
            _ => Ok(()),
        }
    }

    fn read_all_values(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut values = Vec::new();
        for record in rdr.records() {
            values.push(record?.iter().map(str::to_string).collect());
        }
        Ok(values)
    }

    fn append_row(&self, row: &[Cell]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
        wtr.write_record(row.iter().map(Cell::to_string))?;
        wtr.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
