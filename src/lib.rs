#![doc = include_str!("../README.md")]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod holdings;
pub mod oauth;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod sheet;
pub mod summary;
pub mod types;

// Re-exports for convenient access
pub use config::CatalogConfig;
pub use error::Error;
pub use holdings::{HoldingsClient, HoldingsSource};
pub use oauth::{OAuthConfig, TokenResponse, TokenSession};
pub use output::CsvSink;
pub use pipeline::{Pipeline, RowRange, RunStats};
pub use resolver::{Attempt, RetryPolicy, RowResolution, RowResolver};
pub use sheet::{ColumnRef, SheetRow, Worksheet};
pub use summary::{BestHolding, Popularity, best_holding};
pub use types::{BibHoldings, BriefRecord, HoldingPair, OclcNumber, split_candidates};
