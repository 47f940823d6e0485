use std::collections::HashMap;

use crate::model::Cell;

fn flush(current: &mut String, cells: &mut Vec<String>) {
    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }
    current.clear();
}

pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in trimmed.chars() {
        if ch == '\t' {
            flush(&mut current, &mut cells);
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                flush(&mut current, &mut cells);
            } else {
                current.push(' ');
            }
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    flush(&mut current, &mut cells);
    cells
}

pub(crate) fn soft_split_line_into_cells(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

pub(crate) fn normalize_rows(rows: &[Vec<String>], width: usize) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            out.resize(width, String::new());
            out
        })
        .collect()
}

pub(crate) fn modal_width(rows: &[Vec<String>]) -> usize {
    let mut freq = HashMap::new();
    for width in rows.iter().map(Vec::len) {
        *freq.entry(width).or_insert(0_usize) += 1;
    }

    freq.into_iter()
        .max_by_key(|(width, count)| (*count, *width))
        .map_or(0, |(width, _)| width)
}

/// Parses a plain decimal literal such as `42`, `-1.5` or `2e3`.
///
/// Thousands separators, currency signs and words like `inf` or `NaN` are
/// not numbers here.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if !value.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    if !value
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }

    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Converts string rows of a uniform `width` into typed cells. A column is
/// numeric when every non-empty cell in it parses as a number.
pub(crate) fn type_columns(rows: &[Vec<String>], width: usize) -> Vec<Vec<Cell>> {
    let numeric = (0..width)
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .all(|cell| parse_number(cell).is_some())
        })
        .collect::<Vec<_>>();

    rows.iter()
        .map(|row| {
            (0..width)
                .map(|column| {
                    let raw = row.get(column).map_or("", |cell| cell.trim());
                    if raw.is_empty() {
                        Cell::Empty
                    } else if numeric[column] {
                        parse_number(raw).map_or_else(|| Cell::Text(raw.to_string()), Cell::Number)
                    } else {
                        Cell::Text(raw.to_string())
                    }
                })
                .collect()
        })
        .collect()
}
