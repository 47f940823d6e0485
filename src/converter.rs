use std::io::Write;
use std::path::Path;

use pdf_table_extract::Table;

use crate::csv_writer::write_csv;
use crate::error::ConvertError;
use crate::extractor::{PdfTableExtractor, TableExtractor};
use crate::models::{ConversionReport, ConversionWarning, ConvertOptions, OutputFormat};
use crate::xlsx_writer::write_xlsx;

/// Extracts the tables of `source` with `extractor` and writes them to
/// `destination` in the format named by its extension.
///
/// An extraction without tables still writes a file holding one empty table.
///
/// # Errors
///
/// Fails when extraction fails, when the destination extension is neither
/// `.xlsx` nor `.csv`, when CSV columns conflict under
/// [`ColumnPolicy::Strict`](crate::ColumnPolicy::Strict), or when writing fails.
pub fn convert_with<E>(
    extractor: &E,
    source: &Path,
    destination: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError>
where
    E: TableExtractor + ?Sized,
{
    let extraction = extractor.extract(source)?;
    let mut warnings = extraction
        .warnings
        .into_iter()
        .map(ConversionWarning::Extraction)
        .collect::<Vec<_>>();

    let mut tables = extraction.tables;
    if tables.is_empty() {
        warnings.push(ConversionWarning::NoTablesDetected);
        tables.push(Table::empty());
    }

    let format = OutputFormat::from_path(destination)?;
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        tables = tables.len(),
        ?format,
        "writing tables"
    );

    let row_count = match format {
        OutputFormat::Xlsx => write_xlsx(destination, &tables)?,
        OutputFormat::Csv => write_csv(destination, &tables, options.column_policy, &mut warnings)?,
    };

    Ok(ConversionReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        format,
        table_count: tables.len(),
        row_count,
        warnings,
    })
}

/// [`convert_with`] using the PDF extractor configured by `options`.
///
/// # Errors
///
/// See [`convert_with`].
pub fn convert(
    source: &Path,
    destination: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let extractor = PdfTableExtractor::new(options.extract.clone());
    convert_with(&extractor, source, destination, options)
}

/// Prints the outcome of a conversion and tells whether it succeeded.
///
/// Warnings and errors go to `err`, the success line to `out`. Extraction
/// details are summarised unless `verbose` is set.
pub fn report_outcome<O, W>(
    outcome: &Result<ConversionReport, ConvertError>,
    verbose: bool,
    out: &mut O,
    err: &mut W,
) -> bool
where
    O: Write,
    W: Write,
{
    // Write failures on the diagnostic streams are ignored.
    match outcome {
        Ok(report) => {
            let details = report
                .warnings
                .iter()
                .filter(|warning| warning.is_extraction_detail())
                .count();
            for warning in &report.warnings {
                if verbose || !warning.is_extraction_detail() {
                    let _ = writeln!(err, "warning: {warning}");
                }
            }
            if details > 0 && !verbose {
                let _ = writeln!(
                    err,
                    "warning: {details} extraction issue(s) detected (use --verbose for details)"
                );
            }
            let _ = writeln!(out, "{}", report.summary());
            true
        }
        Err(error) => {
            tracing::debug!(code = error.code(), "conversion failed");
            let _ = writeln!(err, "{error}");
            false
        }
    }
}

/// Runs one conversion and reports it on stdout/stderr. Never panics on
/// conversion failures; the return value is the success flag.
pub fn convert_and_report<E>(
    extractor: &E,
    source: &Path,
    destination: &Path,
    options: &ConvertOptions,
    verbose: bool,
) -> bool
where
    E: TableExtractor + ?Sized,
{
    let outcome = convert_with(extractor, source, destination, options);
    report_outcome(
        &outcome,
        verbose,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pdf_table_extract::{
        Cell, ExtractError, ExtractWarning, Extraction, Table, WarningCode,
    };
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::{convert_with, report_outcome};
    use crate::error::ConvertError;
    use crate::models::{ConversionReport, ConversionWarning, ConvertOptions, OutputFormat};

    fn name_age(names: &[&str]) -> Table {
        Table {
            page: Some(1),
            columns: vec!["Name".to_string(), "Age".to_string()],
            rows: names
                .iter()
                .map(|name| vec![Cell::Text((*name).to_string()), Cell::Number(1.0)])
                .collect(),
        }
    }

    #[test]
    fn empty_extraction_writes_placeholder_and_warns() {
        let dir = tempdir().expect("tempdir should be created");
        let destination = dir.path().join("empty.csv");
        let extractor = |_: &Path| -> Result<Extraction, ExtractError> { Ok(Extraction::default()) };

        let report = convert_with(
            &extractor,
            Path::new("in.pdf"),
            &destination,
            &ConvertOptions::default(),
        )
        .expect("conversion should succeed");

        assert_eq!(report.table_count, 1);
        assert_eq!(report.row_count, 0);
        assert_eq!(report.warnings, vec![ConversionWarning::NoTablesDetected]);
        assert!(destination.exists());
    }

    #[test]
    fn unsupported_extension_is_reported_after_extraction() {
        let dir = tempdir().expect("tempdir should be created");
        let destination = dir.path().join("out.txt");
        let extractor = |_: &Path| -> Result<Extraction, ExtractError> {
            Ok(Extraction {
                tables: vec![name_age(&["a"])],
                warnings: Vec::new(),
            })
        };

        let error = convert_with(
            &extractor,
            Path::new("in.pdf"),
            &destination,
            &ConvertOptions::default(),
        )
        .expect_err("txt is unsupported");

        assert!(matches!(error, ConvertError::UnsupportedFormat { .. }));
        assert!(!destination.exists());
    }

    #[test]
    fn extraction_failure_wins_over_unsupported_extension() {
        let extractor =
            |_: &Path| -> Result<Extraction, ExtractError> { Err(ExtractError::NoPagesSelected) };

        let error = convert_with(
            &extractor,
            Path::new("in.pdf"),
            Path::new("out.txt"),
            &ConvertOptions::default(),
        )
        .expect_err("extraction fails first");

        assert!(matches!(error, ConvertError::Extraction(_)));
    }

    #[test]
    fn csv_row_count_is_sum_of_tables() {
        let dir = tempdir().expect("tempdir should be created");
        let destination = dir.path().join("out.CSV");
        let extractor = |_: &Path| -> Result<Extraction, ExtractError> {
            Ok(Extraction {
                tables: vec![name_age(&["a", "b"]), name_age(&["c"])],
                warnings: Vec::new(),
            })
        };

        let report = convert_with(
            &extractor,
            Path::new("in.pdf"),
            &destination,
            &ConvertOptions::default(),
        )
        .expect("conversion should succeed");

        assert_eq!(report.format, OutputFormat::Csv);
        assert_eq!(report.table_count, 2);
        assert_eq!(report.row_count, 3);
        let csv = std::fs::read_to_string(&destination).expect("csv should be readable");
        assert_eq!(csv, "Name,Age\na,1\nb,1\nc,1\n");
    }

    #[test]
    fn reports_success_and_failure_lines() {
        let dir = tempdir().expect("tempdir should be created");
        let destination = dir.path().join("out.csv");
        let extractor = |_: &Path| -> Result<Extraction, ExtractError> { Ok(Extraction::default()) };
        let outcome = convert_with(
            &extractor,
            Path::new("in.pdf"),
            &destination,
            &ConvertOptions::default(),
        );

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert!(report_outcome(&outcome, false, &mut out, &mut err));
        let out = String::from_utf8(out).expect("utf-8");
        let err = String::from_utf8(err).expect("utf-8");
        assert!(out.starts_with("Successfully extracted 1 table(s) from in.pdf to "));
        assert!(err.contains("No tables found in PDF. Creating empty file."));

        let failed = Err(ConvertError::UnsupportedFormat {
            extension: ".txt".to_string(),
        });
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert!(!report_outcome(&failed, false, &mut out, &mut err));
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).expect("utf-8"),
            "Unsupported output format: .txt\n"
        );
    }

    #[test]
    fn extraction_details_are_summarised_unless_verbose() {
        let detail = ExtractWarning::new(WarningCode::LowConfidence, "table confidence is low")
            .with_page(2)
            .with_table_index(1);
        let report = ConversionReport {
            source: "in.pdf".into(),
            destination: "out.csv".into(),
            format: OutputFormat::Csv,
            table_count: 1,
            row_count: 3,
            warnings: vec![
                ConversionWarning::Extraction(detail.clone()),
                ConversionWarning::Extraction(detail),
            ],
        };
        let outcome = Ok(report);

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert!(report_outcome(&outcome, false, &mut out, &mut err));
        assert_eq!(
            String::from_utf8(err).expect("utf-8"),
            "warning: 2 extraction issue(s) detected (use --verbose for details)\n"
        );

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert!(report_outcome(&outcome, true, &mut out, &mut err));
        assert_eq!(
            String::from_utf8(err).expect("utf-8"),
            "warning: table confidence is low (page 2, table 1)\n".repeat(2)
        );
        assert_eq!(
            String::from_utf8(out).expect("utf-8"),
            "Successfully extracted 1 table(s) from in.pdf to out.csv\n"
        );
    }
}
