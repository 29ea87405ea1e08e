use derive_more::Display;

use crate::types::{HoldingPair, OclcNumber};

/// How widely a record is held, bucketed from its library count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Popularity {
    #[display("unique")]
    Unique,
    #[display("few copies")]
    FewCopies,
    #[display("some copies")]
    SomeCopies,
    #[display("many copies")]
    ManyCopies,
}

impl Popularity {
    /// Bucket upper bounds are inclusive: 1, 5, 49.
    #[must_use]
    pub fn from_count(library_count: u32) -> Self {
        match library_count {
            0..=1 => Self::Unique,
            2..=5 => Self::FewCopies,
            6..=49 => Self::SomeCopies,
            _ => Self::ManyCopies,
        }
    }
}

/// The record chosen for a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestHolding {
    pub oclc_number: OclcNumber,
    pub library_count: u32,
    pub summary: Popularity,
}

/// Picks the most widely held record; the first one seen wins ties.
///
/// Returns `None` when nothing was resolved for the row.
#[must_use]
pub fn best_holding(pairs: &[HoldingPair]) -> Option<BestHolding> {
    let best = pairs
        .iter()
        .reduce(|best, pair| if pair.library_count > best.library_count { pair } else { best })?;
    Some(BestHolding {
        oclc_number: best.oclc_number.clone(),
        library_count: best.library_count,
        summary: Popularity::from_count(best.library_count),
    })
}
