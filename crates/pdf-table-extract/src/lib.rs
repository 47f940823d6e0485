//! Table extraction from text-based PDFs.
//!
//! Page text is recovered with `lopdf` and `pdf-extract`, table candidates are
//! found from the text layout (cells separated by tabs or runs of spaces), and
//! each table is returned with column labels and typed cells.

mod error;
mod header;
mod model;
mod options;
mod pdf_reader;
mod table_detect;
mod table_parse;
mod warning;

use std::path::Path;

use crate::header::{column_labels, split_header};
use crate::model::{DetectedTable, PageText};
use crate::pdf_reader::read_pdf_pages;
use crate::table_detect::{LOW_CONFIDENCE_THRESHOLD, detect_tables};
use crate::table_parse::{normalize_rows, type_columns};

pub use error::ExtractError;
pub use model::{Cell, Table};
pub use options::{ExtractOptions, HeaderMode, PageSelection, QualityMode};
pub use warning::{ExtractWarning, WarningCode};

/// Tables found in one document, in page order, plus non-fatal findings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub tables: Vec<Table>,
    pub warnings: Vec<ExtractWarning>,
}

fn apply_quality_mode(
    tables: Vec<DetectedTable>,
    mode: QualityMode,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<Vec<DetectedTable>, ExtractError> {
    let mut out = Vec::new();

    for table in tables {
        if table.confidence >= LOW_CONFIDENCE_THRESHOLD {
            out.push(table);
            continue;
        }

        match mode {
            QualityMode::BestEffort => {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::LowConfidence,
                        "table confidence is low; exported in best-effort mode",
                    )
                    .with_page(table.page)
                    .with_table_index(out.len() + 1)
                    .with_confidence(table.confidence),
                );
                out.push(table);
            }
            QualityMode::Strict => {
                return Err(ExtractError::AmbiguousTable {
                    page: table.page,
                    confidence: table.confidence,
                });
            }
            QualityMode::SkipAmbiguous => {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::SkippedAmbiguousTable,
                        "skipping low-confidence table",
                    )
                    .with_page(table.page)
                    .with_confidence(table.confidence),
                );
            }
        }
    }

    Ok(out)
}

fn build_table(
    detected: &DetectedTable,
    mode: HeaderMode,
    warnings: &mut Vec<ExtractWarning>,
    table_index: usize,
) -> Table {
    let (header, data) = split_header(detected, mode, warnings, table_index);
    let width = data
        .iter()
        .map(Vec::len)
        .chain(header.map(<[String]>::len))
        .max()
        .unwrap_or(0);

    let rows = normalize_rows(data, width);
    Table {
        page: Some(detected.page),
        columns: column_labels(header, width),
        rows: type_columns(&rows, width),
    }
}

fn extract_from_pages(
    pages: &[PageText],
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let mut warnings = Vec::new();
    let detected = detect_tables(pages, options.min_cols);
    let kept = apply_quality_mode(detected, options.quality_mode, &mut warnings)?;

    let tables = kept
        .iter()
        .enumerate()
        .map(|(index, table)| build_table(table, options.header_mode, &mut warnings, index + 1))
        .collect();

    Ok(Extraction { tables, warnings })
}

fn validate_options(options: &ExtractOptions) -> Result<(), ExtractError> {
    if options.min_cols < 2 {
        return Err(ExtractError::InvalidOption(
            "min_cols must be at least 2".to_string(),
        ));
    }
    if options.pages.as_ref().is_some_and(PageSelection::is_empty) {
        return Err(ExtractError::InvalidPageSelection(
            "page selection cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Extracts every table from the PDF at `input_pdf`.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed as a PDF, when the page
/// selection matches no page, when options are invalid, or, in
/// [`QualityMode::Strict`], when a table is ambiguous.
pub fn extract_tables(
    input_pdf: &Path,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    validate_options(options)?;
    let bytes = std::fs::read(input_pdf)?;
    extract_tables_from_bytes(&bytes, options)
}

/// Same as [`extract_tables`] for a PDF already held in memory.
///
/// # Errors
///
/// See [`extract_tables`].
pub fn extract_tables_from_bytes(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    validate_options(options)?;
    let pages = read_pdf_pages(input_pdf, options.pages.as_ref())?;
    let extraction = extract_from_pages(&pages, options)?;

    tracing::debug!(
        tables = extraction.tables.len(),
        warnings = extraction.warnings.len(),
        "extraction finished"
    );
    Ok(extraction)
}
