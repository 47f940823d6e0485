//! Converts the tables of a PDF document into an XLSX workbook or a CSV file.

pub mod converter;
pub mod error;
pub mod extractor;
pub mod models;

mod csv_writer;
mod xlsx_writer;

pub use converter::{convert, convert_and_report, convert_with, report_outcome};
pub use error::ConvertError;
pub use extractor::{PdfTableExtractor, TableExtractor};
pub use models::{
    ColumnPolicy, ConversionReport, ConversionWarning, ConvertOptions, OutputFormat,
};
pub use pdf_table_extract::{
    Cell, ExtractError, ExtractOptions, Extraction, HeaderMode, PageSelection, QualityMode, Table,
};
