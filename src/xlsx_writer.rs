use std::path::Path;

use pdf_table_extract::{Cell, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::ConvertError;
use crate::models::{SINGLE_SHEET_NAME, TABLE_SHEET_PREFIX};

/// Sheet names for `count` tables: `Sheet1` alone, otherwise `Table_1`, `Table_2`, ...
pub(crate) fn sheet_names(count: usize) -> Vec<String> {
    if count == 1 {
        return vec![SINGLE_SHEET_NAME.to_string()];
    }
    (1..=count)
        .map(|index| format!("{TABLE_SHEET_PREFIX}{index}"))
        .collect()
}

fn column_number(index: usize) -> Result<u16, ConvertError> {
    u16::try_from(index).map_err(|_| {
        ConvertError::Write(format!("column {index} is beyond the spreadsheet column limit"))
    })
}

fn row_number(index: usize) -> Result<u32, ConvertError> {
    u32::try_from(index)
        .map_err(|_| ConvertError::Write(format!("row {index} is beyond the spreadsheet row limit")))
}

fn write_sheet(
    worksheet: &mut Worksheet,
    table: &Table,
    header_format: &Format,
) -> Result<(), ConvertError> {
    for (col, label) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col)?, label, header_format)?;
    }

    for (index, cells) in table.rows.iter().enumerate() {
        let row = row_number(index + 1)?;
        for (col, cell) in cells.iter().enumerate() {
            let col = column_number(col)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, *value)?;
                }
            }
        }
    }

    Ok(())
}

/// Writes one sheet per table and returns the data row count.
///
/// The workbook is assembled in memory and only reaches disk when it is
/// saved, after every sheet has been written.
pub(crate) fn write_xlsx(path: &Path, tables: &[Table]) -> Result<usize, ConvertError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for (table, name) in tables.iter().zip(sheet_names(tables.len())) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_sheet(worksheet, table, &header_format)?;
        tracing::debug!(
            sheet = %name,
            columns = table.column_count(),
            rows = table.row_count(),
            "sheet written"
        );
    }

    workbook.save(path)?;
    Ok(tables.iter().map(Table::row_count).sum())
}
