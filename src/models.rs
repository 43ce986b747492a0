//! Data models for the student dashboard.
//!
//! This module contains the core data structures used throughout the
//! application: the canonical student record, the raw sheet shape handed
//! to the normalizer, the aggregate views consumed by the report renderer,
//! and the content blocks parsed out of assistant answers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One worksheet from an uploaded workbook: a name plus a rectangular grid
/// of string-coerced cells. The first row is the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Worksheet name; becomes the `academic_year` of every record it yields.
    pub name: String,
    /// All rows, header row included.
    pub rows: Vec<Vec<String>>,
}

/// A normalized student record. Created once per ingestion run from a single
/// sheet row and immutable thereafter; every new upload replaces the whole
/// record set.
///
/// Serialized with camelCase field names because the record list doubles as
/// the JSON context handed to the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Student identifier; records with an empty id never leave ingestion.
    pub student_id: String,
    /// Honorific prefix (นาย, นางสาว, ...).
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    /// Enrollment status category; `"Unknown"` when the cell is blank.
    pub status: String,
    /// Year of study, 0 when unparsable.
    pub year: i32,
    /// Cumulative grade-point average on a 0.0-4.0 scale, 0 when unparsable.
    pub gpax: f64,
    /// Free-text program label, composed from the primary and secondary
    /// program columns joined by a single space.
    pub program: String,
    pub room: String,
    /// Curriculum/track label; `"N/A"` when the source sheet carries none.
    pub curriculum: String,
    /// Cohort label, taken from the source sheet's name rather than a column.
    pub academic_year: String,
}

/// One slice of the status distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBucket {
    /// Distinct status value, in first-appearance order.
    pub name: String,
    pub count: usize,
    /// Share of all records, formatted with two decimal digits.
    pub percentage: String,
}

/// One fixed range of the GPAX histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaBucket {
    /// Range label, e.g. `"2.0-2.49"`.
    pub range: String,
    /// Sub-count per curriculum; carries an entry (possibly 0) for every
    /// curriculum in [`Aggregates::unique_curriculums`].
    pub per_curriculum: BTreeMap<String, usize>,
    /// Total records in this range across all curriculums.
    pub total: usize,
}

/// One row of the academic-year x curriculum crosstab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub academic_year: String,
    /// The "All Curriculums" column.
    pub total: usize,
    /// Per-curriculum counters; same column universe as the histogram.
    pub per_curriculum: BTreeMap<String, usize>,
}

/// Total and share for one curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumTotal {
    pub curriculum: String,
    pub count: usize,
    pub percentage: String,
}

/// Students on academic probation, grouped by curriculum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbationSummary {
    pub total: usize,
    /// `(curriculum, count)` pairs sorted by count descending.
    pub by_curriculum: Vec<(String, usize)>,
}

/// The full aggregate bundle computed from a record set. Recomputed from
/// scratch on every call, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub total_records: usize,
    pub mean_gpax: f64,
    pub status_distribution: Vec<StatusBucket>,
    pub gpa_histogram: Vec<GpaBucket>,
    pub year_crosstab: Vec<YearRow>,
    pub curriculum_totals: Vec<CurriculumTotal>,
    pub probation: ProbationSummary,
    /// Sorted distinct curriculum labels; the shared column universe for the
    /// histogram and the crosstab.
    pub unique_curriculums: Vec<String>,
}

/// A structured piece of an assistant answer, safe to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// A single line of prose.
    Paragraph { text: String },
    /// A pipe-delimited table; every row has exactly `headers.len()` cells.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ContentBlock {
    /// Convenience constructor for prose blocks.
    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }
}

/// Metadata about a generated dashboard report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Name of the ingested workbook.
    pub source_file: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the dataset.
    pub total_records: usize,
    /// Number of sheets that contributed records.
    pub sheets_ingested: usize,
    /// Sheets skipped during ingestion, with the reason.
    pub skipped_sheets: Vec<String>,
}

/// The complete dashboard report: metadata plus every aggregate view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub aggregates: Aggregates,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> StudentRecord {
        StudentRecord {
            student_id: "65010001".to_string(),
            title: "นาย".to_string(),
            first_name: "สมชาย".to_string(),
            last_name: "ใจดี".to_string(),
            status: "ปกติ".to_string(),
            year: 2,
            gpax: 3.5,
            program: "IT".to_string(),
            room: "A1".to_string(),
            curriculum: "IT-Regular".to_string(),
            academic_year: "2565".to_string(),
        }
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["studentId"], "65010001");
        assert_eq!(json["firstName"], "สมชาย");
        assert_eq!(json["academicYear"], "2565");
        assert_eq!(json["gpax"], 3.5);
        assert!(json.get("student_id").is_none());
    }

    #[test]
    fn test_record_round_trips() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: StudentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_content_block_tagging() {
        let block = ContentBlock::paragraph("hello");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert_eq!(json["text"], "hello");

        let table = ContentBlock::Table {
            headers: vec!["A".to_string()],
            rows: vec![vec!["1".to_string()]],
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["type"], "table");
    }
}
