//! Per-state workbooks: one `<STATE>.xlsx` per state, one sheet per city.
//!
//! Existing workbooks are read with calamine and rewritten whole with
//! rust_xlsxwriter. Sheets that a save does not touch are copied across
//! cell for cell, and the new file replaces the old one by rename.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::types::{VenueRecord, VENUE_COLUMNS};

/// Excel refuses sheet names longer than this.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// A header row plus string cells. Empty strings stand for blank cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn from_records(records: &[VenueRecord]) -> Self {
        Self {
            columns: VENUE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(VenueRecord::to_row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Appends `other` below this table, matching columns by name. Columns
    /// only `other` has are added on the right; cells a row lacks stay blank.
    pub fn append(&mut self, other: SheetTable) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }

        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|name| match self.column_index(name) {
                Some(idx) => idx,
                None => {
                    self.columns.push(name.clone());
                    self.columns.len() - 1
                }
            })
            .collect();

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        for row in other.rows {
            let mut aligned = vec![String::new(); width];
            for (cell, &idx) in row.into_iter().zip(&mapping) {
                aligned[idx] = cell;
            }
            self.rows.push(aligned);
        }
    }

    /// Sets `name` to `value` on every row, adding the column if needed.
    pub fn stamp_column(&mut self, name: &str, value: &str) {
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                self.columns.len() - 1
            }
        };
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
            row[idx] = value.to_string();
        }
    }

    fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let columns = match rows.next() {
            Some(header) => header.iter().map(cell_to_string).collect(),
            None => return Self::default(),
        };
        let rows = rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Self { columns, rows }
    }
}

/// Ordered `(sheet name, table)` pairs of one workbook.
pub type Sheets = Vec<(String, SheetTable)>;

pub fn state_file_path(dir: &Path, state: &str) -> PathBuf {
    dir.join(format!("{}.xlsx", state))
}

pub fn sheet_name_for(city: &str) -> String {
    let name: String = city.chars().take(MAX_SHEET_NAME_LEN).collect();
    name.trim_end().to_string()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        other => other.to_string(),
    }
}

/// Reads every sheet of `path`, in workbook order.
pub fn read_workbook(path: &Path) -> Result<Sheets> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| ScrapeError::workbook(path, e))?;
    let names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ScrapeError::workbook(path, e))?;
        debug!("Read sheet {} from {:?} ({} rows)", name, path, range.height());
        sheets.push((name, SheetTable::from_range(&range)));
    }
    Ok(sheets)
}

/// Writes `sheets` to `path`, replacing any previous file only once the new
/// one is complete.
pub fn write_workbook(path: &Path, sheets: &[(String, SheetTable)]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .map_err(|e| ScrapeError::workbook(path, e))?;

        for (col, header) in table.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &header_format)
                .map_err(|e| ScrapeError::workbook(path, e))?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet
                    .write_string(r as u32 + 1, col as u16, cell)
                    .map_err(|e| ScrapeError::workbook(path, e))?;
            }
        }
    }

    let tmp_path = path.with_extension("xlsx.tmp");
    let saved = workbook
        .save(&tmp_path)
        .map_err(|e| ScrapeError::workbook(path, e))
        .and_then(|()| fs::rename(&tmp_path, path).map_err(ScrapeError::from));
    if saved.is_err() && tmp_path.is_file() {
        // The previous workbook is untouched; only the partial copy goes.
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!("Could not remove {:?}: {}", tmp_path, e);
        }
    }
    saved
}

/// Appends `records` to the `city` sheet of the state's workbook.
///
/// Returns false, without touching storage, when there is nothing to write.
pub fn save_batch(dir: &Path, state: &str, city: &str, records: &[VenueRecord]) -> Result<bool> {
    let batch = SheetTable::from_records(records);
    if batch.is_empty() {
        info!("No data to save for {}, {}.", city, state);
        return Ok(false);
    }

    let path = state_file_path(dir, state);
    let sheet = sheet_name_for(city);

    let mut sheets = if path.exists() {
        read_workbook(&path)?
    } else {
        Vec::new()
    };

    match sheets.iter_mut().find(|(name, _)| *name == sheet) {
        Some((_, existing)) => existing.append(batch),
        None => sheets.push((sheet, batch)),
    }

    write_workbook(&path, &sheets)?;
    info!("Data written to {}, {}.", city, state);
    Ok(true)
}
