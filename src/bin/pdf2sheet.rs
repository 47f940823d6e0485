use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use pdf_table_convert::{
    ColumnPolicy, ConvertOptions, ExtractOptions, HeaderMode, PageSelection, PdfTableExtractor,
    QualityMode, convert_and_report,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2sheet",
    version,
    about = "Extract tables from a PDF into an XLSX workbook or a CSV file"
)]
struct Cli {
    /// Input PDF path.
    #[arg(value_name = "INPUT_PDF")]
    input: PathBuf,

    /// Output path; the extension (.xlsx or .csv) selects the format.
    #[arg(value_name = "OUTPUT_XLSX_OR_CSV")]
    output: PathBuf,

    /// Page selection like 1-3,5. Defaults to all pages.
    #[arg(long)]
    pages: Option<String>,

    /// Always use the first row of each table as its header.
    #[arg(long, conflicts_with = "no_header")]
    has_header: bool,

    /// Never use a header row; columns are named col_1, col_2, ...
    #[arg(long, conflicts_with = "has_header")]
    no_header: bool,

    /// Minimum cells required per candidate table row.
    #[arg(long, default_value_t = 2)]
    min_cols: usize,

    /// Handling of tables with an irregular layout.
    #[arg(long, value_enum, default_value_t = Quality::BestEffort)]
    quality: Quality,

    /// Fail CSV output when tables do not share the same columns.
    #[arg(long)]
    strict_columns: bool,

    /// Print every extraction warning.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Quality {
    BestEffort,
    Strict,
    SkipAmbiguous,
}

impl From<Quality> for QualityMode {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::BestEffort => Self::BestEffort,
            Quality::Strict => Self::Strict,
            Quality::SkipAmbiguous => Self::SkipAmbiguous,
        }
    }
}

fn parse_options(cli: &Cli) -> Result<ConvertOptions> {
    let pages = cli
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    let header_mode = if cli.has_header {
        HeaderMode::HasHeader
    } else if cli.no_header {
        HeaderMode::NoHeader
    } else {
        HeaderMode::AutoDetect
    };

    let column_policy = if cli.strict_columns {
        ColumnPolicy::Strict
    } else {
        ColumnPolicy::Union
    };

    Ok(ConvertOptions {
        extract: ExtractOptions {
            pages,
            header_mode,
            quality_mode: cli.quality.into(),
            min_cols: cli.min_cols,
        },
        column_policy,
    })
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdf_table_convert=warn,pdf_table_extract=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
    // PDF parsing panics are caught and recovered from inside extraction.
    std::panic::set_hook(Box::new(|info| tracing::debug!(%info, "panic")));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = error.print();
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = error.print();
            return ExitCode::from(1);
        }
    };

    let options = match parse_options(&cli) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::from(1);
        }
    };

    let extractor = PdfTableExtractor::new(options.extract.clone());
    if convert_and_report(&extractor, &cli.input, &cli.output, &options, cli.verbose) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
