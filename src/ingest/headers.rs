//! Header-to-role resolution for workbook sheets.
//!
//! Recognized header labels live in a configuration table rather than in
//! the parsing code, so a different registrar export (or locale) only needs
//! a `[headers]` section in `.gradelens.toml`.

use serde::{Deserialize, Serialize};

/// Accepted header labels per record role. Matching is exact string
/// equality against the trimmed header cell; the first accepted label found
/// in the header row wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderLabels {
    /// Student identifier column (required).
    #[serde(default = "default_student_id")]
    pub student_id: Vec<String>,

    /// Honorific prefix column.
    #[serde(default = "default_title")]
    pub title: Vec<String>,

    /// First name column.
    #[serde(default = "default_first_name")]
    pub first_name: Vec<String>,

    /// Last name column.
    #[serde(default = "default_last_name")]
    pub last_name: Vec<String>,

    /// Enrollment status column (required).
    #[serde(default = "default_status")]
    pub status: Vec<String>,

    /// Year-of-study column.
    #[serde(default = "default_year")]
    pub year: Vec<String>,

    /// Cumulative GPA column (required).
    #[serde(default = "default_gpax")]
    pub gpax: Vec<String>,

    /// Primary program column.
    #[serde(default = "default_program")]
    pub program: Vec<String>,

    /// Secondary program column, appended to the primary one.
    #[serde(default = "default_program_secondary")]
    pub program_secondary: Vec<String>,

    /// Room/section column.
    #[serde(default = "default_room")]
    pub room: Vec<String>,

    /// Curriculum/track column.
    #[serde(default = "default_curriculum")]
    pub curriculum: Vec<String>,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            student_id: default_student_id(),
            title: default_title(),
            first_name: default_first_name(),
            last_name: default_last_name(),
            status: default_status(),
            year: default_year(),
            gpax: default_gpax(),
            program: default_program(),
            program_secondary: default_program_secondary(),
            room: default_room(),
            curriculum: default_curriculum(),
        }
    }
}

fn default_student_id() -> Vec<String> {
    vec!["รหัสนักศึกษา".to_string()]
}

fn default_title() -> Vec<String> {
    vec!["คำนำหน้า".to_string()]
}

fn default_first_name() -> Vec<String> {
    vec!["ชื่อ".to_string()]
}

fn default_last_name() -> Vec<String> {
    vec!["นามสกุล".to_string()]
}

fn default_status() -> Vec<String> {
    vec!["สถานะ".to_string()]
}

fn default_year() -> Vec<String> {
    vec!["ชั้นปี".to_string()]
}

fn default_gpax() -> Vec<String> {
    vec!["GPAX".to_string()]
}

fn default_program() -> Vec<String> {
    vec!["หลักสูตร".to_string()]
}

fn default_program_secondary() -> Vec<String> {
    vec!["หลักสูตร2".to_string()]
}

fn default_room() -> Vec<String> {
    vec!["ห้อง".to_string()]
}

fn default_curriculum() -> Vec<String> {
    vec!["หลักสูตร3".to_string()]
}

/// Resolved column indices for one sheet's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub student_id: usize,
    pub status: usize,
    pub gpax: usize,
    pub title: Option<usize>,
    pub first_name: Option<usize>,
    pub last_name: Option<usize>,
    pub year: Option<usize>,
    pub program: Option<usize>,
    pub program_secondary: Option<usize>,
    pub room: Option<usize>,
    pub curriculum: Option<usize>,
}

impl HeaderLabels {
    /// Resolve a header row into column indices.
    ///
    /// Returns the names of the missing required roles when the sheet cannot
    /// be used; optional roles simply resolve to `None`.
    pub fn resolve(&self, header_row: &[String]) -> Result<ColumnMap, Vec<&'static str>> {
        let find = |labels: &[String]| {
            header_row
                .iter()
                .position(|cell| labels.iter().any(|label| label == cell.trim()))
        };

        let student_id = find(&self.student_id);
        let status = find(&self.status);
        let gpax = find(&self.gpax);

        let mut missing = Vec::new();
        if student_id.is_none() {
            missing.push("student_id");
        }
        if status.is_none() {
            missing.push("status");
        }
        if gpax.is_none() {
            missing.push("gpax");
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ColumnMap {
            student_id: student_id.unwrap(),
            status: status.unwrap(),
            gpax: gpax.unwrap(),
            title: find(&self.title),
            first_name: find(&self.first_name),
            last_name: find(&self.last_name),
            year: find(&self.year),
            program: find(&self.program),
            program_secondary: find(&self.program_secondary),
            room: find(&self.room),
            curriculum: find(&self.curriculum),
        })
    }
}
