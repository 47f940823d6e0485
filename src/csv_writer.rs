use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use pdf_table_extract::Table;

use crate::error::ConvertError;
use crate::models::{ColumnPolicy, ConversionWarning};

/// All tables' rows stacked under one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConcatenatedRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn same_labels(left: &[String], right: &[String]) -> bool {
    left.len() == right.len() && right.iter().all(|label| left.contains(label))
}

/// Stacks tables, aligning cells by column label.
pub(crate) fn concat_by_label(
    tables: &[Table],
    policy: ColumnPolicy,
    warnings: &mut Vec<ConversionWarning>,
) -> Result<ConcatenatedRows, ConvertError> {
    let Some(first) = tables.first() else {
        return Ok(ConcatenatedRows {
            columns: Vec::new(),
            rows: Vec::new(),
        });
    };

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (index, table) in tables.iter().enumerate() {
        if index > 0 && !same_labels(&first.columns, &table.columns) {
            match policy {
                ColumnPolicy::Strict => {
                    return Err(ConvertError::ColumnMismatch {
                        table: index + 1,
                        expected: first.columns.clone(),
                        found: table.columns.clone(),
                    });
                }
                ColumnPolicy::Union => warnings.push(ConversionWarning::ColumnMismatch {
                    table: index + 1,
                    columns: table.columns.clone(),
                }),
            }
        }

        for label in &table.columns {
            if !positions.contains_key(label.as_str()) {
                positions.insert(label, columns.len());
                columns.push(label.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(tables.iter().map(Table::row_count).sum());
    for table in tables {
        let targets = table
            .columns
            .iter()
            .map(|label| positions[label.as_str()])
            .collect::<Vec<_>>();
        for cells in &table.rows {
            let mut row = vec![String::new(); columns.len()];
            for (cell, &target) in cells.iter().zip(&targets) {
                row[target] = cell.to_string();
            }
            rows.push(row);
        }
    }

    Ok(ConcatenatedRows { columns, rows })
}

pub(crate) fn write_rows<W: Write>(writer: W, rows: &ConcatenatedRows) -> Result<(), ConvertError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(&rows.columns)?;
    for row in &rows.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every table into one CSV file and returns the data row count.
///
/// A table set without any column produces an empty file.
pub(crate) fn write_csv(
    path: &Path,
    tables: &[Table],
    policy: ColumnPolicy,
    warnings: &mut Vec<ConversionWarning>,
) -> Result<usize, ConvertError> {
    let rows = concat_by_label(tables, policy, warnings)?;
    let file = File::create(path)?;
    if rows.columns.is_empty() {
        return Ok(0);
    }

    write_rows(file, &rows)?;
    tracing::debug!(
        path = %path.display(),
        columns = rows.columns.len(),
        rows = rows.rows.len(),
        "csv written"
    );
    Ok(rows.rows.len())
}
