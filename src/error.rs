use std::fmt::{Display, Formatter};

use pdf_table_extract::ExtractError;

#[derive(Debug)]
pub enum ConvertError {
    UnsupportedFormat {
        extension: String,
    },
    Extraction(ExtractError),
    Write(String),
    ColumnMismatch {
        table: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl ConvertError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Extraction(_) => "extraction_failed",
            Self::Write(_) => "write_failed",
            Self::ColumnMismatch { .. } => "column_mismatch",
        }
    }
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat { extension } if extension.is_empty() => {
                write!(f, "Unsupported output format: (no extension)")
            }
            Self::UnsupportedFormat { extension } => {
                write!(f, "Unsupported output format: {extension}")
            }
            Self::Extraction(error) => write!(f, "Error extracting tables from PDF: {error}"),
            Self::Write(message) => write!(f, "Error writing output file: {message}"),
            Self::ColumnMismatch {
                table,
                expected,
                found,
            } => write!(
                f,
                "table {table} columns [{}] do not match table 1 columns [{}]",
                found.join(", "),
                expected.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Extraction(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ExtractError> for ConvertError {
    fn from(error: ExtractError) -> Self {
        Self::Extraction(error)
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(error: std::io::Error) -> Self {
        Self::Write(error.to_string())
    }
}

impl From<csv::Error> for ConvertError {
    fn from(error: csv::Error) -> Self {
        Self::Write(error.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ConvertError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(error.to_string())
    }
}
