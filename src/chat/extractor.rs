//! Table extraction from assistant answers.
//!
//! Assistant replies interleave prose with Markdown-style pipe tables. This
//! parser decomposes such a reply into an ordered sequence of
//! [`ContentBlock`]s without ever failing: malformed table constructs
//! degrade to plain paragraphs, and no content is dropped.

use crate::models::ContentBlock;

/// Parse an answer into paragraph and table blocks.
///
/// A line is a table candidate when its trimmed form starts and ends with
/// `|`. A run of candidate lines forms a table only when it has at least two
/// lines and the second contains the `---` header separator; anything else
/// falls back to one paragraph per buffered line. An input that produces no
/// blocks at all (blank or whitespace-only) yields a single paragraph with
/// the original text verbatim.
pub fn extract_blocks(text: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let trimmed = line.trim();

        if trimmed.starts_with('|') && trimmed.ends_with('|') {
            buffer.push(trimmed);
            continue;
        }

        flush_table_buffer(&mut buffer, &mut blocks);
        if !trimmed.is_empty() {
            blocks.push(ContentBlock::paragraph(trimmed));
        }
    }

    flush_table_buffer(&mut buffer, &mut blocks);

    if blocks.is_empty() {
        blocks.push(ContentBlock::paragraph(text));
    }

    blocks
}

/// Finalize a run of buffered table-candidate lines into either one table
/// block or a paragraph per line.
fn flush_table_buffer(buffer: &mut Vec<&str>, blocks: &mut Vec<ContentBlock>) {
    if buffer.is_empty() {
        return;
    }

    if let Some(table) = parse_table(buffer) {
        blocks.push(table);
    } else {
        blocks.extend(buffer.iter().map(|line| ContentBlock::paragraph(*line)));
    }
    buffer.clear();
}

/// Try to interpret buffered lines as header / separator / data rows.
fn parse_table(lines: &[&str]) -> Option<ContentBlock> {
    if lines.len() < 2 || !lines[1].contains("---") {
        return None;
    }

    let headers = split_cells(lines[0]);
    if headers.is_empty() {
        return None;
    }

    let rows: Vec<Vec<String>> = lines[2..]
        .iter()
        .map(|line| split_cells(line))
        .filter(|row| !row.is_empty() && row.iter().any(|cell| !cell.is_empty()))
        .map(|mut row| {
            // Rows must match the header width for the renderer.
            row.resize(headers.len(), String::new());
            row
        })
        .collect();

    if rows.is_empty() {
        return None;
    }

    Some(ContentBlock::Table { headers, rows })
}

/// Split a `| a | b |` line into trimmed cells, dropping the empty fragments
/// produced by the outer delimiters.
fn split_cells(line: &str) -> Vec<String> {
    let fragments: Vec<&str> = line.split('|').collect();
    if fragments.len() <= 2 {
        return Vec::new();
    }
    fragments[1..fragments.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> ContentBlock {
        ContentBlock::paragraph(text)
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> ContentBlock {
        ContentBlock::Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_prose_followed_by_table() {
        let blocks = extract_blocks("Result:\n| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(
            blocks,
            vec![
                paragraph("Result:"),
                table(&["A", "B"], &[&["1", "2"]]),
            ]
        );
    }

    #[test]
    fn test_missing_separator_degrades_to_paragraphs() {
        let blocks = extract_blocks("| A | B |\n| 1 | 2 |");
        assert_eq!(blocks, vec![paragraph("| A | B |"), paragraph("| 1 | 2 |")]);
    }

    #[test]
    fn test_empty_input_yields_one_paragraph() {
        assert_eq!(extract_blocks(""), vec![paragraph("")]);
    }

    #[test]
    fn test_whitespace_only_input_is_preserved_verbatim() {
        let text = "   \n\t  \n";
        assert_eq!(extract_blocks(text), vec![paragraph(text)]);
    }

    #[test]
    fn test_table_without_data_rows_degrades_to_paragraphs() {
        let blocks = extract_blocks("| A | B |\n|---|---|");
        assert_eq!(
            blocks,
            vec![paragraph("| A | B |"), paragraph("|---|---|")]
        );
    }

    #[test]
    fn test_all_blank_rows_are_dropped() {
        let blocks = extract_blocks("| A | B |\n|---|---|\n|   |  |\n| 1 | 2 |");
        assert_eq!(blocks, vec![table(&["A", "B"], &[&["1", "2"]])]);
    }

    #[test]
    fn test_ragged_rows_are_normalized_to_header_width() {
        let blocks = extract_blocks("| A | B |\n|---|---|\n| 1 |\n| 1 | 2 | 3 |");
        assert_eq!(
            blocks,
            vec![table(&["A", "B"], &[&["1", ""], &["1", "2"]])]
        );
    }

    #[test]
    fn test_prose_and_multiple_tables_interleave() {
        let text = "Intro\n\n| A |\n|---|\n| 1 |\nBetween\n| B |\n|---|\n| 2 |";
        let blocks = extract_blocks(text);
        assert_eq!(
            blocks,
            vec![
                paragraph("Intro"),
                table(&["A"], &[&["1"]]),
                paragraph("Between"),
                table(&["B"], &[&["2"]]),
            ]
        );
    }

    #[test]
    fn test_table_at_end_of_input_is_flushed() {
        let blocks = extract_blocks("| A |\n|---|\n| 1 |");
        assert_eq!(blocks, vec![table(&["A"], &[&["1"]])]);
    }

    #[test]
    fn test_blank_lines_produce_no_blocks() {
        let blocks = extract_blocks("first\n\n\nsecond");
        assert_eq!(blocks, vec![paragraph("first"), paragraph("second")]);
    }

    #[test]
    fn test_indented_table_lines_are_recognized() {
        let blocks = extract_blocks("  | A |\n  |---|\n  | 1 |");
        assert_eq!(blocks, vec![table(&["A"], &[&["1"]])]);
    }

    #[test]
    fn test_single_pipe_run_falls_back_to_paragraph() {
        // A lone candidate line can never form a table.
        let blocks = extract_blocks("| just one |");
        assert_eq!(blocks, vec![paragraph("| just one |")]);
    }
}
