//! Workbook ingestion and normalization.
//!
//! Turns the untyped sheet grids of an uploaded workbook into the flat,
//! ordered `StudentRecord` sequence the rest of the application works with.
//! Sheets missing required headers are skipped (and reported), not fatal;
//! only an empty merged result fails the ingestion.

pub mod error;
pub mod headers;
pub mod reader;

pub use error::IngestError;
pub use headers::{ColumnMap, HeaderLabels};
pub use reader::read_workbook;

use std::fmt;

use tracing::{debug, info};

use crate::models::{Sheet, StudentRecord};

/// Status value assigned when the status cell is blank.
const UNKNOWN_STATUS: &str = "Unknown";

/// Curriculum sentinel for sheets without a curriculum column.
const NO_CURRICULUM: &str = "N/A";

/// Why a sheet contributed no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The sheet had no rows at all.
    Empty,
    /// The header row lacked one or more required roles.
    MissingHeaders(Vec<&'static str>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "sheet is empty"),
            SkipReason::MissingHeaders(roles) => {
                write!(f, "missing required headers: {}", roles.join(", "))
            }
        }
    }
}

/// A sheet that was skipped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSheet {
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

/// The outcome of a successful normalization run.
#[derive(Debug, Clone, Default)]
pub struct NormalizedData {
    /// All records, in sheet order then row order.
    pub records: Vec<StudentRecord>,
    /// Sheets that contributed nothing, with the reason.
    pub skipped_sheets: Vec<SkippedSheet>,
    /// Number of sheets that passed header resolution.
    pub sheets_ingested: usize,
}

/// Normalize all sheets of a workbook into student records.
///
/// Sheets are processed in input order and rows top to bottom; the output
/// preserves that order. Returns [`IngestError::EmptyDataset`] when no sheet
/// yields a single record.
pub fn normalize(sheets: &[Sheet], labels: &HeaderLabels) -> Result<NormalizedData, IngestError> {
    let mut data = NormalizedData::default();

    for sheet in sheets {
        let Some(header_row) = sheet.rows.first() else {
            debug!("Skipping sheet '{}': no rows", sheet.name);
            data.skipped_sheets.push(SkippedSheet {
                name: sheet.name.clone(),
                reason: SkipReason::Empty,
            });
            continue;
        };

        let columns = match labels.resolve(header_row) {
            Ok(columns) => columns,
            Err(missing) => {
                info!(
                    "Skipping sheet '{}': missing required headers ({})",
                    sheet.name,
                    missing.join(", ")
                );
                data.skipped_sheets.push(SkippedSheet {
                    name: sheet.name.clone(),
                    reason: SkipReason::MissingHeaders(missing),
                });
                continue;
            }
        };

        data.sheets_ingested += 1;

        let before = data.records.len();
        data.records.extend(
            sheet.rows[1..]
                .iter()
                .filter_map(|row| map_row(row, &columns, &sheet.name)),
        );
        debug!(
            "Sheet '{}' yielded {} records",
            sheet.name,
            data.records.len() - before
        );
    }

    if data.records.is_empty() {
        return Err(IngestError::EmptyDataset);
    }

    info!(
        "Normalized {} records from {} sheet(s) ({} skipped)",
        data.records.len(),
        data.sheets_ingested,
        data.skipped_sheets.len()
    );

    Ok(data)
}

/// Map one data row to a record. Returns `None` when the student id is
/// empty after trimming; nothing else fails a row.
fn map_row(row: &[String], columns: &ColumnMap, sheet_name: &str) -> Option<StudentRecord> {
    let student_id = cell(row, columns.student_id);
    if student_id.is_empty() {
        return None;
    }

    let status = cell(row, columns.status);
    let program = cell_opt(row, columns.program);
    let program_secondary = cell_opt(row, columns.program_secondary);
    let curriculum = cell_opt(row, columns.curriculum);

    Some(StudentRecord {
        student_id: student_id.to_string(),
        title: cell_opt(row, columns.title).to_string(),
        first_name: cell_opt(row, columns.first_name).to_string(),
        last_name: cell_opt(row, columns.last_name).to_string(),
        status: if status.is_empty() {
            UNKNOWN_STATUS.to_string()
        } else {
            status.to_string()
        },
        year: parse_number(cell_opt(row, columns.year)) as i32,
        gpax: parse_number(cell(row, columns.gpax)),
        program: format!("{program} {program_secondary}").trim().to_string(),
        room: cell_opt(row, columns.room).to_string(),
        curriculum: if curriculum.is_empty() {
            NO_CURRICULUM.to_string()
        } else {
            curriculum.to_string()
        },
        academic_year: sheet_name.to_string(),
    })
}

/// Trimmed cell content at a known index; empty when the row is short.
fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|value| value.trim()).unwrap_or("")
}

/// Trimmed cell content for an optional column.
fn cell_opt(row: &[String], index: Option<usize>) -> &str {
    index.map(|idx| cell(row, idx)).unwrap_or("")
}

/// Numeric coercion with a 0 default; never fails the row.
fn parse_number(value: &str) -> f64 {
    value.parse::<f64>().unwrap_or(0.0)
}
