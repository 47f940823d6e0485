use std::collections::HashSet;

use crate::model::DetectedTable;
use crate::options::HeaderMode;
use crate::table_parse::parse_number;
use crate::warning::{ExtractWarning, WarningCode};

const HEADER_CONFIDENCE_THRESHOLD: f32 = 0.55;

fn non_numeric_ratio(cells: &[String]) -> f32 {
    if cells.is_empty() {
        return 0.0;
    }

    let non_numeric = cells
        .iter()
        .filter(|cell| parse_number(&cell.replace(',', "")).is_none())
        .count();
    non_numeric as f32 / cells.len() as f32
}

pub(crate) fn infer_has_header(rows: &[Vec<String>]) -> (bool, f32) {
    if rows.is_empty() {
        return (false, 0.0);
    }

    let first = non_numeric_ratio(&rows[0]);
    let second = rows.get(1).map_or(0.0, |row| non_numeric_ratio(row));

    // A text row over text rows is still a header; confidence only drops.
    let confidence = (first * 0.6 + (1.0 - second) * 0.4).clamp(0.0, 1.0);
    let has_header = first >= 0.6;
    (has_header, confidence)
}

/// Splits a detected table into its header row (if any) and data rows.
pub(crate) fn split_header<'a>(
    table: &'a DetectedTable,
    mode: HeaderMode,
    warnings: &mut Vec<ExtractWarning>,
    table_index: usize,
) -> (Option<&'a [String]>, &'a [Vec<String>]) {
    let Some((first, rest)) = table.rows.split_first() else {
        return (None, &[]);
    };

    match mode {
        HeaderMode::HasHeader => (Some(first.as_slice()), rest),
        HeaderMode::NoHeader => (None, table.rows.as_slice()),
        HeaderMode::AutoDetect => {
            let (has_header, confidence) = infer_has_header(&table.rows);
            if confidence < HEADER_CONFIDENCE_THRESHOLD {
                let message = if has_header {
                    "header inference confidence is low; using the first row as header"
                } else {
                    "header inference confidence is low; keeping the first row as data"
                };
                warnings.push(
                    ExtractWarning::new(WarningCode::HeaderInferenceLowConfidence, message)
                        .with_page(table.page)
                        .with_table_index(table_index)
                        .with_confidence(confidence),
                );
            }

            if has_header {
                (Some(first.as_slice()), rest)
            } else {
                (None, table.rows.as_slice())
            }
        }
    }
}

/// Builds `width` unique column labels.
///
/// Blank header cells become `Unnamed: <index>`, repeats get `.1`, `.2`, ...
/// and tables without a header row are labelled `col_1` .. `col_n`.
pub(crate) fn column_labels(header: Option<&[String]>, width: usize) -> Vec<String> {
    let Some(header) = header else {
        return (1..=width).map(|index| format!("col_{index}")).collect();
    };

    let mut seen = HashSet::new();
    let mut labels = Vec::with_capacity(width);
    for index in 0..width {
        let base = header
            .get(index)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map_or_else(|| format!("Unnamed: {index}"), str::to_string);

        let mut label = base.clone();
        let mut suffix = 1;
        while seen.contains(&label) {
            label = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(label.clone());
        labels.push(label);
    }

    labels
}
