use std::io::Write;

use crate::error::Error;
use crate::holdings::HoldingsSource;
use crate::output::CsvSink;
use crate::resolver::{RetryPolicy, RowResolver};
use crate::sheet::{ColumnRef, Worksheet};
use crate::summary::best_holding;
use crate::types::split_candidates;

/// First data row; row 1 holds the headers.
pub const FIRST_DATA_ROW: u32 = 2;

/// Inclusive bounds on which spreadsheet rows are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowRange {
    pub from: Option<u32>,
    pub to: Option<u32>,
}

impl RowRange {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `to` comes before the effective first row.
    pub fn new(from: Option<u32>, to: Option<u32>) -> Result<Self, Error> {
        let range = Self { from, to };
        if let Some(to) = to {
            if to < range.first_row() {
                return Err(Error::Config(format!(
                    "--to {to} is before the first processed row {}",
                    range.first_row()
                )));
            }
        }
        Ok(range)
    }

    #[must_use]
    pub fn first_row(&self) -> u32 {
        self.from.unwrap_or(FIRST_DATA_ROW).max(FIRST_DATA_ROW)
    }

    /// The header is written only when the run starts at the first data row.
    #[must_use]
    pub fn emits_header(&self) -> bool {
        self.first_row() == FIRST_DATA_ROW
    }
}

/// Counters for one run, logged when it completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_written: usize,
    pub rows_resolved: usize,
    pub lookups: usize,
    pub skipped_merged: usize,
    pub permanent_failures: usize,
}

/// Drives rows through resolution and reduction into the CSV sink.
pub struct Pipeline<S> {
    source: S,
    policy: RetryPolicy,
    column: ColumnRef,
}

impl<S: HoldingsSource> Pipeline<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: RetryPolicy::default(),
            column: ColumnRef::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Column holding the merged OCLC numbers.
    #[must_use]
    pub fn with_column(mut self, column: ColumnRef) -> Self {
        self.column = column;
        self
    }

    /// Holdings source the pipeline queries.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Process `sheet` rows within `range`, writing one CSV record per row.
    ///
    /// Rows written before a fatal error stay written.
    ///
    /// # Errors
    ///
    /// Propagates fatal lookup errors from the resolver and CSV write failures.
    pub async fn run<W: Write>(
        &mut self,
        sheet: &Worksheet,
        range: RowRange,
        sink: &mut CsvSink<W>,
    ) -> Result<RunStats, Error> {
        let mut stats = RunStats::default();

        if range.emits_header() {
            sink.write_header(&sheet.headers)?;
        }

        let first_row = range.first_row();
        for row in sheet.rows.iter().filter(|row| row.number >= first_row) {
            let candidates = row.cell(self.column).map(split_candidates).unwrap_or_default();

            let resolution = RowResolver::new(&mut self.source, self.policy)
                .resolve(row.number, &candidates)
                .await?;
            let best = best_holding(&resolution.pairs);

            sink.write_row(&row.cells, best.as_ref())?;

            stats.rows_written += 1;
            stats.rows_resolved += usize::from(best.is_some());
            stats.lookups += resolution.lookups;
            stats.skipped_merged += resolution.skipped_merged;
            stats.permanent_failures += resolution.permanent_failures;

            if range.to.is_some_and(|to| row.number >= to) {
                break;
            }
        }

        tracing::info!(
            rows_written = stats.rows_written,
            rows_resolved = stats.rows_resolved,
            lookups = stats.lookups,
            skipped_merged = stats.skipped_merged,
            permanent_failures = stats.permanent_failures,
            "Run complete"
        );
        Ok(stats)
    }
}
