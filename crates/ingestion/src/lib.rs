//! Data ingestion and normalization for the hidden liquidity estimator.
//!
//! This crate handles:
//! - Loading the quote table (schema enforcement)
//! - Quote cleaning (exchange, session, price and spread filters)
//! - Canonical ordering by (symbol, exchange, timestamp)

pub mod cleaner;
pub mod loader;

pub use cleaner::{parse_timestamp, CleaningStats, QuoteCleaner};
pub use loader::{load_quotes_csv, read_quotes, REQUIRED_COLUMNS};
