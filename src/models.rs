use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use pdf_table_extract::{ExtractOptions, ExtractWarning};

use crate::error::ConvertError;

pub const SINGLE_SHEET_NAME: &str = "Sheet1";
pub const TABLE_SHEET_PREFIX: &str = "Table_";
pub const NO_TABLES_NOTICE: &str = "No tables found in PDF. Creating empty file.";

/// Container format of the destination file, chosen by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    /// Case-insensitive lookup of the destination extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedFormat`] for anything other than
    /// `.xlsx` or `.csv`, including paths without an extension.
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => Err(ConvertError::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
                    .unwrap_or_default(),
            }),
        }
    }
}

/// How CSV output treats tables whose column labels differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPolicy {
    /// Union of all labels in order of first appearance; gaps stay empty.
    #[default]
    Union,
    /// Every table must carry the same labels as the first one.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub extract: ExtractOptions,
    pub column_policy: ColumnPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionWarning {
    NoTablesDetected,
    ColumnMismatch { table: usize, columns: Vec<String> },
    Extraction(ExtractWarning),
}

impl ConversionWarning {
    #[must_use]
    pub fn is_extraction_detail(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }
}

impl Display for ConversionWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTablesDetected => f.write_str(NO_TABLES_NOTICE),
            Self::ColumnMismatch { table, columns } => write!(
                f,
                "table {table} has columns [{}] that differ from table 1; aligning by label",
                columns.join(", ")
            ),
            Self::Extraction(warning) => {
                f.write_str(&warning.message)?;
                if let Some(page) = warning.page {
                    write!(f, " (page {page}")?;
                    if let Some(table) = warning.table_index {
                        write!(f, ", table {table}")?;
                    }
                    if let Some(confidence) = warning.confidence {
                        write!(f, ", confidence {confidence:.2}")?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub format: OutputFormat,
    /// Tables written, counting the placeholder table of an empty result.
    pub table_count: usize,
    pub row_count: usize,
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionReport {
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Successfully extracted {} table(s) from {} to {}",
            self.table_count,
            self.source.display(),
            self.destination.display()
        )
    }
}
