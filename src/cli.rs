use std::path::PathBuf;

use clap::Parser;

use crate::config::CatalogConfig;
use crate::error::Error;
use crate::holdings::HoldingsClient;
use crate::oauth::TokenSession;
use crate::output::CsvSink;
use crate::pipeline::{Pipeline, RowRange, RunStats};
use crate::sheet::{ColumnRef, Worksheet};

/// Add WorldCat library holding counts to a spreadsheet of merged OCLC numbers.
///
/// Writes CSV to stdout; diagnostics go to stderr.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Spreadsheet to read (first worksheet, headers in row 1).
    pub input: PathBuf,

    /// First row to process (1-based). The CSV header is only written when starting at row 2.
    #[arg(short = 'f', long, value_name = "ROW")]
    pub from: Option<u32>,

    /// Last row to process (1-based, inclusive).
    #[arg(short = 't', long, value_name = "ROW")]
    pub to: Option<u32>,

    /// Column holding the "; "-separated OCLC numbers.
    #[arg(short = 'c', long, value_name = "LETTERS", default_value = "I")]
    pub column: ColumnRef,
}

/// Run the enrichment described by `args` against the live catalog.
///
/// # Errors
///
/// Returns configuration, spreadsheet, lookup and output errors; rows written
/// before a failure remain on stdout.
pub async fn run(args: Args, config: CatalogConfig) -> Result<RunStats, Error> {
    let range = RowRange::new(args.from, args.to)?;
    let sheet = Worksheet::open(&args.input)?;

    tracing::info!(
        input = %args.input.display(),
        rows = sheet.rows.len(),
        first_row = range.first_row(),
        last_row = ?range.to,
        "Starting holdings lookup"
    );

    let session = TokenSession::new(config.oauth);
    let client = HoldingsClient::new(session, config.base_url);
    let mut pipeline = Pipeline::new(client).with_column(args.column);

    let mut sink = CsvSink::new(std::io::stdout());
    let stats = pipeline.run(&sheet, range, &mut sink).await?;
    sink.into_inner()?;
    Ok(stats)
}
