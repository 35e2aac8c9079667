use std::{
    fs,
    path::{Path, PathBuf},
};

use indicatif::ProgressBar;
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::workbook::{read_workbook, SheetTable};

pub const CITY_COLUMN: &str = "City";
pub const STATE_COLUMN: &str = "State";

/// State workbooks in `dir`, sorted by file name.
pub fn list_state_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xlsx = path.extension().map_or(false, |ext| ext == "xlsx");
        let is_lock_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.starts_with("~$"));
        if is_xlsx && !is_lock_file && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Every city sheet of one state workbook, stamped with its City and State.
pub fn stamped_tables(path: &Path) -> Result<Vec<SheetTable>> {
    let state = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();

    let tables = read_workbook(path)?
        .into_iter()
        .map(|(city, mut table)| {
            table.stamp_column(CITY_COLUMN, &city);
            table.stamp_column(STATE_COLUMN, &state);
            debug!("{} / {}: {} rows", state, city, table.len());
            table
        })
        .collect();
    Ok(tables)
}

/// Concatenates `tables` in order. There must be at least one.
pub fn concat_tables(tables: Vec<SheetTable>, dir: &Path) -> Result<SheetTable> {
    if tables.is_empty() {
        return Err(ScrapeError::NoInput {
            dir: dir.to_path_buf(),
        });
    }
    let mut combined = SheetTable::default();
    for table in tables {
        combined.append(table);
    }
    Ok(combined)
}

pub fn write_csv(table: &SheetTable, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Flattens every state workbook in `input_dir` into one CSV at `output`.
/// Returns the number of data rows written.
pub fn combine_directory(input_dir: &Path, output: &Path, progress: &ProgressBar) -> Result<usize> {
    let files = list_state_workbooks(input_dir)?;
    info!("Found {} state workbooks in {:?}", files.len(), input_dir);
    progress.set_length(files.len() as u64);

    let mut tables = Vec::new();
    for path in &files {
        tables.extend(stamped_tables(path)?);
        progress.inc(1);
    }

    let combined = concat_tables(tables, input_dir)?;
    write_csv(&combined, output)?;
    progress.finish();

    info!("Wrote {} rows to {:?}", combined.len(), output);
    Ok(combined.len())
}
