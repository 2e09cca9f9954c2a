//! Core types and configuration for the hidden liquidity estimator.
//!
//! This crate provides shared types used across all other crates:
//! - Quote records (raw and cleaned)
//! - The 10x10 decile grid and the fit result
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{CleaningConfig, Config, FitConfig};
pub use error::{Error, Result};
pub use types::*;
