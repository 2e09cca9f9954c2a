//! Feature computation for the hidden liquidity estimator.
//!
//! This crate handles:
//! - Size decile assignment (bid and ask independently)
//! - Empirical up-move matrix (U) and cell weights (D)
//! - The parametric model matrix U(h)

pub mod deciles;
pub mod empirical;
pub mod model;

pub use deciles::{assign_deciles, quantile_edges};
pub use empirical::{EmpiricalMatrices, EmpiricalMatrixBuilder};
pub use model::{model_probability, model_uij, MODEL_EPSILON};
