//! Merge-aware resolution of one row's OCLC numbers into holding pairs.
//!
//! Candidates are resolved strictly in source order. A record's
//! `mergedOclcNumbers` mark later candidates as already covered, so they are
//! skipped without a lookup; which duplicate survives depends on that order.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::Error;
use crate::holdings::HoldingsSource;
use crate::types::{BibHoldings, HoldingPair, OclcNumber};

/// Retry limits for transient (HTTP 500) lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per candidate, including the first.
    pub max_attempts: u32,
    /// Wait between attempts.
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Outcome of one lookup attempt, classified for the retry loop.
#[derive(Debug)]
pub enum Attempt {
    Success(BibHoldings),
    /// Upstream overload; worth waiting and trying again.
    Retryable(Error),
    /// The catalog rejected this number; skip it and keep going.
    Permanent(Error),
    /// Anything else aborts the run.
    Fatal(Error),
}

impl From<Result<BibHoldings, Error>> for Attempt {
    fn from(result: Result<BibHoldings, Error>) -> Self {
        match result {
            Ok(holdings) => Self::Success(holdings),
            Err(err) => match err.status() {
                Some(400) => Self::Permanent(err),
                Some(500) => Self::Retryable(err),
                _ => Self::Fatal(err),
            },
        }
    }
}

/// Per-row resolution state. Created empty for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowResolution {
    /// Numbers already covered by a previously resolved record.
    pub merged_seen: HashSet<OclcNumber>,
    /// Resolved pairs in the order they were returned.
    pub pairs: Vec<HoldingPair>,
    /// Lookups issued, retries included.
    pub lookups: usize,
    /// Candidates skipped because an earlier record had merged them.
    pub skipped_merged: usize,
    /// Candidates the catalog rejected with HTTP 400.
    pub permanent_failures: usize,
}

impl RowResolution {
    fn absorb(&mut self, holdings: BibHoldings) {
        for record in holdings.brief_records.unwrap_or_default() {
            let library_count = record.library_count();
            self.merged_seen.extend(record.merged_oclc_numbers);
            self.pairs.push(HoldingPair {
                oclc_number: record.oclc_number,
                library_count,
            });
        }
    }
}

/// Resolves rows against a [`HoldingsSource`] with the configured retry policy.
pub struct RowResolver<'a, S> {
    source: &'a mut S,
    policy: RetryPolicy,
}

impl<'a, S: HoldingsSource> RowResolver<'a, S> {
    #[must_use]
    pub fn new(source: &'a mut S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Resolve `candidates` for spreadsheet row `row`.
    ///
    /// HTTP 400 failures are logged and skipped. HTTP 500 failures wait out
    /// the cooldown and retry until `max_attempts` is reached.
    ///
    /// # Errors
    ///
    /// Returns the last lookup error when retries are exhausted, or the first
    /// error that is neither a 400 nor a 500.
    pub async fn resolve(
        &mut self,
        row: u32,
        candidates: &[OclcNumber],
    ) -> Result<RowResolution, Error> {
        let mut state = RowResolution::default();

        for number in candidates {
            if state.merged_seen.contains(number) {
                tracing::debug!(row, oclc_number = %number, "Skipping merged OCLC number");
                state.skipped_merged += 1;
                continue;
            }
            self.resolve_one(row, number, &mut state).await?;
        }

        Ok(state)
    }

    async fn resolve_one(
        &mut self,
        row: u32,
        number: &OclcNumber,
        state: &mut RowResolution,
    ) -> Result<(), Error> {
        let mut attempt = 0u32;
        loop {
            state.lookups += 1;
            match Attempt::from(self.source.get_holdings(number).await) {
                Attempt::Success(holdings) => {
                    state.absorb(holdings);
                    return Ok(());
                }
                Attempt::Permanent(err) => {
                    tracing::error!(
                        row,
                        oclc_number = %number,
                        detail = err.detail().unwrap_or_default(),
                        "OCLC number rejected by catalog, skipping"
                    );
                    state.permanent_failures += 1;
                    return Ok(());
                }
                Attempt::Retryable(err) => {
                    attempt += 1;
                    tracing::error!(row, oclc_number = %number, attempt, "Catalog server error");
                    if attempt >= self.policy.max_attempts {
                        return Err(err);
                    }
                    tracing::error!(
                        row,
                        oclc_number = %number,
                        detail = err.detail().unwrap_or_default(),
                        cooldown_secs = self.policy.cooldown.as_secs(),
                        "Retrying after cooldown"
                    );
                    tokio::time::sleep(self.policy.cooldown).await;
                }
                Attempt::Fatal(err) => {
                    tracing::error!(row, oclc_number = %number, error = %err, "Lookup failed");
                    return Err(err);
                }
            }
        }
    }
}
