//! Excel workbook reading.
//!
//! Converts an Excel workbook into the untyped [`Sheet`] grids consumed
//! by the normalizer. The container format is detected from the file
//! extension, so legacy `.xls` exports read the same way as `.xlsx`.
//! Every cell is coerced to a string here; type recovery (numbers,
//! defaults) happens during normalization.

use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use tracing::debug;

use crate::ingest::error::IngestError;
use crate::models::Sheet;

/// Read all worksheets of a workbook, in workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>, IngestError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = match workbook.worksheet_range(&name) {
            Some(result) => result?,
            None => continue,
        };

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
            .collect();

        debug!("Read sheet '{}' with {} rows", name, rows.len());
        sheets.push(Sheet { name, rows });
    }

    Ok(sheets)
}

/// Coerce a cell value into the string the normalizer works with.
fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
