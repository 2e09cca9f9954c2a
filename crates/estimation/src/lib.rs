//! Hidden liquidity estimation.
//!
//! This crate provides:
//! - Bounded Brent minimization of the weighted model loss
//! - The per-symbol estimation pipeline (clean, select, tabulate, fit)

pub mod fitter;
pub mod pipeline;

pub use fitter::{weighted_loss, BoundedBrent, HFit, HiddenLiquidityFitter, Minimum};
pub use pipeline::{run_pipeline, select_symbol, Estimator};
