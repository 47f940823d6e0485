use std::path::Path;

use pdf_table_extract::{ExtractError, ExtractOptions, Extraction, extract_tables};

/// Source of tables for a conversion.
pub trait TableExtractor {
    /// Returns every table found in `source`, in document order.
    ///
    /// # Errors
    ///
    /// Any failure to read or interpret the source document.
    fn extract(&self, source: &Path) -> Result<Extraction, ExtractError>;
}

/// Extracts tables from text-based PDFs with `pdf-table-extract`.
#[derive(Debug, Clone, Default)]
pub struct PdfTableExtractor {
    options: ExtractOptions,
}

impl PdfTableExtractor {
    #[must_use]
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }
}

impl TableExtractor for PdfTableExtractor {
    fn extract(&self, source: &Path) -> Result<Extraction, ExtractError> {
        extract_tables(source, &self.options)
    }
}

impl<F> TableExtractor for F
where
    F: Fn(&Path) -> Result<Extraction, ExtractError>,
{
    fn extract(&self, source: &Path) -> Result<Extraction, ExtractError> {
        self(source)
    }
}
