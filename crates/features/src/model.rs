//! Parametric up-move probability model.
//!
//! `U(h)[i][j] = (i + h) / (i + j + 2h + eps)` for bid decile `i` and ask
//! decile `j`. A larger bid decile raises the up-move probability; a larger
//! hidden liquidity level `h` pulls every cell towards 1/2.

use hliq_core::DecileGrid;

/// Keeps the denominator nonzero at `h = 0`.
pub const MODEL_EPSILON: f64 = 1e-12;

/// Model up-move probability for one (bid decile, ask decile) cell.
#[inline]
pub fn model_probability(bid_decile: usize, ask_decile: usize, h: f64) -> f64 {
    let i = bid_decile as f64;
    let j = ask_decile as f64;
    (i + h) / (i + j + 2.0 * h + MODEL_EPSILON)
}

/// Full 10x10 model matrix at `h`.
pub fn model_uij(h: f64) -> DecileGrid {
    DecileGrid::from_fn(|i, j| model_probability(i, j, h))
}
