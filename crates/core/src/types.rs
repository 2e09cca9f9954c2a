//! Core data types for the hidden liquidity estimator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of size buckets per side.
pub const NUM_DECILES: usize = 10;

/// Decile label in `1..=NUM_DECILES`.
pub type DecileLabel = u8;

/// A raw top-of-book quote as read from the input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Instrument root symbol (`SYM_ROOT`).
    pub symbol: String,
    /// Exchange code (`EX`).
    pub exchange: String,
    /// Trade date string (`DATE`).
    pub date: String,
    /// Time of day string (`TIME_M`).
    pub time: String,
    /// Best bid price.
    pub bid: f64,
    /// Best ask price.
    pub ask: f64,
    /// Displayed bid size.
    pub bid_size: f64,
    /// Displayed ask size.
    pub ask_size: f64,
}

/// A quote that passed cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedQuote {
    pub symbol: String,
    pub exchange: String,
    /// Timestamp floored to whole seconds.
    pub ts: DateTime<Utc>,
    pub bid: f64,
    /// Best ask price.
    pub offer: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    /// `offer - bid`, always positive.
    pub spread: f64,
    /// Spread rounded to whole cents.
    pub spread_cents: i64,
    /// Time of day as `HH:MM:SS`.
    pub time: String,
}

impl CleanedQuote {
    /// Calculate mid price.
    #[inline]
    pub fn mid(&self) -> f64 {
        (self.bid + self.offer) / 2.0
    }
}

/// A 10x10 grid indexed by (bid decile, ask decile).
///
/// Labels are 1-based on the public accessors; row `i` is the bid decile and
/// column `j` the ask decile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecileGrid([[f64; NUM_DECILES]; NUM_DECILES]);

impl DecileGrid {
    /// Grid with every cell set to zero.
    pub fn zeros() -> Self {
        Self([[0.0; NUM_DECILES]; NUM_DECILES])
    }

    /// Build a grid from a function of the 1-based (bid, ask) labels.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut cells = [[0.0; NUM_DECILES]; NUM_DECILES];
        for (r, row) in cells.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = f(r + 1, c + 1);
            }
        }
        Self(cells)
    }

    /// Build a grid from nested rows. Returns `None` unless the input is 10x10.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        if rows.len() != NUM_DECILES || rows.iter().any(|r| r.len() != NUM_DECILES) {
            return None;
        }
        Some(Self::from_fn(|i, j| rows[i - 1][j - 1]))
    }

    /// Value at 1-based (bid decile, ask decile).
    ///
    /// # Panics
    /// Panics if either label is outside `1..=10`.
    #[inline]
    pub fn get(&self, bid_decile: usize, ask_decile: usize) -> f64 {
        self.0[bid_decile - 1][ask_decile - 1]
    }

    /// Set the value at 1-based (bid decile, ask decile).
    #[inline]
    pub fn set(&mut self, bid_decile: usize, ask_decile: usize, value: f64) {
        self.0[bid_decile - 1][ask_decile - 1] = value;
    }

    /// Always `(10, 10)`.
    pub fn shape(&self) -> (usize, usize) {
        (NUM_DECILES, NUM_DECILES)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    /// Sum over every cell.
    pub fn sum(&self) -> f64 {
        self.cells().sum()
    }

    /// Copy into nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.0.iter().map(|row| row.to_vec()).collect()
    }
}

impl Default for DecileGrid {
    fn default() -> Self {
        Self::zeros()
    }
}

/// Output of one estimation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Symbol the fit was run for.
    pub symbol: String,
    /// Fitted hidden liquidity level.
    pub implied_h: f64,
    /// Weighted squared error at `implied_h`.
    pub loss: f64,
    /// Empirical up-move probabilities (U).
    pub u_empirical: DecileGrid,
    /// Model probabilities at `implied_h`.
    pub u_model: DecileGrid,
    /// Cell occurrence weights (D).
    pub d_weights: DecileGrid,
}

impl FitResult {
    /// True when no cell carried weight, so `implied_h` is not identified.
    pub fn is_degenerate(&self) -> bool {
        self.d_weights.sum() == 0.0
    }
}
