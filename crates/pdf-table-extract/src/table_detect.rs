use crate::model::{DetectedTable, PageText};
use crate::table_parse::{modal_width, soft_split_line_into_cells, split_line_into_cells};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;

fn table_confidence(rows: &[Vec<String>]) -> f32 {
    if rows.len() < 2 {
        return 0.0;
    }

    let modal = modal_width(rows);
    if modal == 0 {
        return 0.0;
    }

    let consistent =
        rows.iter().filter(|row| row.len() == modal).count() as f32 / rows.len() as f32;
    let max_width = rows.iter().map(Vec::len).max().unwrap_or(modal);
    let min_width = rows.iter().map(Vec::len).min().unwrap_or(modal);
    let uniformity = if max_width == 0 {
        0.0
    } else {
        1.0 - ((max_width - min_width) as f32 / max_width as f32)
    };

    (consistent * 0.75 + uniformity * 0.25).clamp(0.0, 1.0)
}

/// Cells of `line` when it reads as a table row, otherwise `None`.
fn row_cells(line: &str, min_cols: usize) -> Option<Vec<String>> {
    let cells = split_line_into_cells(line);
    if cells.len() >= min_cols {
        return Some(cells);
    }

    let soft_cells = soft_split_line_into_cells(line);
    let has_numeric = soft_cells
        .iter()
        .any(|cell| cell.chars().any(|ch| ch.is_ascii_digit()));
    let looks_like_sentence = ['.', '!', '?', ':']
        .iter()
        .any(|punctuation| line.trim_end().ends_with(*punctuation));

    (soft_cells.len() >= min_cols && !looks_like_sentence && (has_numeric || soft_cells.len() <= 6))
        .then_some(soft_cells)
}

fn detect_tables_in_page(page: &PageText, min_cols: usize) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut current_rows: Vec<Vec<String>> = Vec::new();

    let flush_current = |rows: &mut Vec<Vec<String>>, tables: &mut Vec<DetectedTable>| {
        if rows.len() >= 2 {
            let confidence = table_confidence(rows);
            tables.push(DetectedTable {
                page: page.page_number,
                rows: std::mem::take(rows),
                confidence,
            });
        } else {
            rows.clear();
        }
    };

    for line in page.text.lines() {
        match row_cells(line, min_cols) {
            Some(cells) => current_rows.push(cells),
            None => flush_current(&mut current_rows, &mut tables),
        }
    }

    flush_current(&mut current_rows, &mut tables);
    tables
}

/// Finds table candidates page by page, top to bottom.
pub(crate) fn detect_tables(pages: &[PageText], min_cols: usize) -> Vec<DetectedTable> {
    let min_cols = min_cols.max(2);
    let tables = pages
        .iter()
        .flat_map(|page| detect_tables_in_page(page, min_cols))
        .collect::<Vec<_>>();

    tracing::debug!(
        pages = pages.len(),
        tables = tables.len(),
        "table candidates detected"
    );
    tables
}
