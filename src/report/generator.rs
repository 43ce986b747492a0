//! Markdown and JSON rendering of the dashboard.
//!
//! This module turns the aggregate bundle into the views the dashboard
//! presents: overview cards, status distribution, GPAX histogram, the
//! year x curriculum crosstab, curriculum totals, and the probation
//! summary. It also renders extracted assistant content blocks for the
//! terminal.

use anyhow::Result;

use crate::models::{Aggregates, ContentBlock, DashboardReport, ReportMetadata};

/// Generate a complete Markdown dashboard report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# Student Data Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_overview_section(&report.aggregates));
    output.push_str(&generate_status_section(&report.aggregates));
    output.push_str(&generate_gpa_section(&report.aggregates));
    output.push_str(&generate_year_section(&report.aggregates));
    output.push_str(&generate_curriculum_section(&report.aggregates));
    output.push_str(&generate_probation_section(&report.aggregates));

    output
}

/// Generate the report as pretty-printed JSON.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source File:** {}\n", metadata.source_file));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Records:** {}\n", metadata.total_records));
    section.push_str(&format!(
        "- **Sheets Ingested:** {}\n",
        metadata.sheets_ingested
    ));
    if !metadata.skipped_sheets.is_empty() {
        section.push_str(&format!(
            "- **Sheets Skipped:** {}\n",
            metadata.skipped_sheets.join("; ")
        ));
    }
    section.push('\n');

    section
}

/// Generate the overview cards.
fn generate_overview_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Total Students:** {}\n",
        aggregates.total_records
    ));
    section.push_str(&format!(
        "- **Average GPAX:** {:.2}\n",
        aggregates.mean_gpax
    ));
    section.push_str(&format!(
        "- **Status Categories:** {}\n",
        aggregates.status_distribution.len()
    ));
    section.push_str(&format!(
        "- **Probation Students:** {}\n",
        aggregates.probation.total
    ));
    section.push('\n');

    section
}

/// Generate the status distribution table.
fn generate_status_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## Student Status Overview\n\n");
    section.push_str("| Status | Students | Percentage |\n");
    section.push_str("|--------|----------|------------|\n");
    for bucket in &aggregates.status_distribution {
        section.push_str(&format!(
            "| {} | {} | {}% |\n",
            bucket.name, bucket.count, bucket.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the GPAX histogram with one column per curriculum.
fn generate_gpa_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## GPAX Distribution\n\n");
    section.push_str("| GPAX Range |");
    for curriculum in &aggregates.unique_curriculums {
        section.push_str(&format!(" {curriculum} |"));
    }
    section.push_str(" Total |\n");
    section.push_str(&separator_row(aggregates.unique_curriculums.len() + 2));

    for bucket in &aggregates.gpa_histogram {
        section.push_str(&format!("| {} |", bucket.range));
        for curriculum in &aggregates.unique_curriculums {
            let count = bucket.per_curriculum.get(curriculum).copied().unwrap_or(0);
            section.push_str(&format!(" {count} |"));
        }
        section.push_str(&format!(" {} |\n", bucket.total));
    }
    section.push('\n');

    section
}

/// Generate the students-per-academic-year crosstab.
fn generate_year_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## Students per Academic Year\n\n");
    section.push_str("| Academic Year | All Curriculums |");
    for curriculum in &aggregates.unique_curriculums {
        section.push_str(&format!(" {curriculum} |"));
    }
    section.push('\n');
    section.push_str(&separator_row(aggregates.unique_curriculums.len() + 2));

    for row in &aggregates.year_crosstab {
        section.push_str(&format!("| {} | {} |", row.academic_year, row.total));
        for curriculum in &aggregates.unique_curriculums {
            let count = row.per_curriculum.get(curriculum).copied().unwrap_or(0);
            section.push_str(&format!(" {count} |"));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the students-per-curriculum table.
fn generate_curriculum_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## Students per Curriculum\n\n");
    section.push_str("| Curriculum | Students | Percentage |\n");
    section.push_str("|------------|----------|------------|\n");
    for total in &aggregates.curriculum_totals {
        section.push_str(&format!(
            "| {} | {} | {}% |\n",
            total.curriculum, total.count, total.percentage
        ));
    }
    section.push('\n');

    section
}

/// Generate the probation summary.
fn generate_probation_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## Probation Students\n\n");
    if aggregates.probation.total == 0 {
        section.push_str("No students on probation.\n\n");
        return section;
    }

    section.push_str(&format!("Total: {}\n\n", aggregates.probation.total));
    section.push_str("| Curriculum | Students |\n");
    section.push_str("|------------|----------|\n");
    for (curriculum, count) in &aggregates.probation.by_curriculum {
        section.push_str(&format!("| {curriculum} | {count} |\n"));
    }
    section.push('\n');

    section
}

/// A Markdown separator row with the given column count.
fn separator_row(columns: usize) -> String {
    let mut row = String::from("|");
    for _ in 0..columns {
        row.push_str("---|");
    }
    row.push('\n');
    row
}

/// Render extracted content blocks for terminal display: paragraphs as
/// plain lines, tables with padded, aligned columns.
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    let mut output = String::new();

    for block in blocks {
        match block {
            ContentBlock::Paragraph { text } => {
                output.push_str(text);
                output.push('\n');
            }
            ContentBlock::Table { headers, rows } => {
                output.push_str(&render_table(headers, rows));
            }
        }
    }

    output
}

/// Render one table with columns padded to the widest cell.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx < widths.len() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }
    }

    let mut output = String::new();
    output.push_str(&render_row(headers, &widths));
    output.push_str(&render_divider(&widths));
    for row in rows {
        output.push_str(&render_row(row, &widths));
    }
    output
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (idx, width) in widths.iter().enumerate() {
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        let padding = width - cell.chars().count().min(*width);
        line.push_str(&format!(" {}{} |", cell, " ".repeat(padding)));
    }
    line.push('\n');
    line
}

fn render_divider(widths: &[usize]) -> String {
    let mut line = String::from("|");
    for width in widths {
        line.push_str(&format!("-{}-|", "-".repeat(*width)));
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{aggregate, DashboardRules};
    use crate::models::StudentRecord;
    use chrono::Utc;

    fn record(id: &str, status: &str, gpax: f64, curriculum: &str, year: &str) -> StudentRecord {
        StudentRecord {
            student_id: id.to_string(),
            title: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            status: status.to_string(),
            year: 1,
            gpax,
            program: String::new(),
            room: String::new(),
            curriculum: curriculum.to_string(),
            academic_year: year.to_string(),
        }
    }

    fn sample_report() -> DashboardReport {
        let records = vec![
            record("1", "ปกติ", 1.5, "CS", "2565"),
            record("2", "ปกติ", 3.8, "IT", "2566"),
        ];
        DashboardReport {
            metadata: ReportMetadata {
                source_file: "students.xlsx".to_string(),
                generated_at: Utc::now(),
                total_records: records.len(),
                sheets_ingested: 2,
                skipped_sheets: vec!["notes: missing required headers: gpax".to_string()],
            },
            aggregates: aggregate(&records, &DashboardRules::default()),
        }
    }

    #[test]
    fn test_markdown_report_contains_all_sections() {
        let markdown = generate_markdown_report(&sample_report());
        for section in [
            "## Metadata",
            "## Overview",
            "## Student Status Overview",
            "## GPAX Distribution",
            "## Students per Academic Year",
            "## Students per Curriculum",
            "## Probation Students",
        ] {
            assert!(markdown.contains(section), "missing {section}");
        }
        assert!(markdown.contains("**Total Students:** 2"));
        assert!(markdown.contains("**Average GPAX:** 2.65"));
        assert!(markdown.contains("Sheets Skipped"));
    }

    #[test]
    fn test_markdown_crosstab_has_curriculum_columns() {
        let markdown = generate_markdown_report(&sample_report());
        assert!(markdown.contains("| Academic Year | All Curriculums | CS | IT |"));
        assert!(markdown.contains("| 2565 | 1 |"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let report = sample_report();
        let json = generate_json_report(&report).unwrap();
        let back: DashboardReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.aggregates, report.aggregates);
        assert_eq!(back.metadata.source_file, "students.xlsx");
    }

    #[test]
    fn test_render_blocks_aligns_table_columns() {
        let blocks = vec![
            ContentBlock::paragraph("Top students:"),
            ContentBlock::Table {
                headers: vec!["ID".to_string(), "Name".to_string()],
                rows: vec![
                    vec!["1".to_string(), "Somchai".to_string()],
                    vec!["22".to_string(), "A".to_string()],
                ],
            },
        ];

        let rendered = render_blocks(&blocks);
        assert!(rendered.starts_with("Top students:\n"));
        assert!(rendered.contains("| ID | Name    |"));
        assert!(rendered.contains("| 22 | A       |"));
        assert!(rendered.contains("|----|---------|"));
    }

    #[test]
    fn test_probation_section_handles_empty_case() {
        let mut report = sample_report();
        report.aggregates.probation = Default::default();
        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No students on probation."));
    }
}
