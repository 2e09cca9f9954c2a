//! Empirical up-move and weight matrices.
//!
//! For one symbol's cleaned quotes, pairs every quote with the next quote from
//! the same (symbol, exchange) partition and tabulates, per (bid decile, ask
//! decile) cell, how often the mid price moved strictly up (U) and how often
//! the cell occurred at all (D).

use crate::deciles::assign_deciles;
use hliq_core::{CleanedQuote, DecileGrid, NUM_DECILES};
use std::collections::BTreeMap;
use tracing::debug;

/// Empirical matrices for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalMatrices {
    /// Fraction of observations followed by a strictly higher mid (U).
    pub u: DecileGrid,
    /// Share of observations falling in each cell (D).
    pub d: DecileGrid,
    /// Number of (quote, next quote) pairs tabulated.
    pub observations: usize,
}

impl EmpiricalMatrices {
    /// True when no pair was tabulated and D is all zero.
    pub fn is_empty(&self) -> bool {
        self.observations == 0
    }
}

/// Per-cell tallies.
#[derive(Debug, Clone, Copy, Default)]
struct CellCounts {
    count: [[u64; NUM_DECILES]; NUM_DECILES],
    ups: [[u64; NUM_DECILES]; NUM_DECILES],
}

impl CellCounts {
    fn add(&mut self, bid_decile: usize, ask_decile: usize, up: bool) {
        self.count[bid_decile - 1][ask_decile - 1] += 1;
        if up {
            self.ups[bid_decile - 1][ask_decile - 1] += 1;
        }
    }

    fn total(&self) -> u64 {
        self.count.iter().flatten().sum()
    }
}

/// Builder for the empirical matrices.
#[derive(Debug, Clone, Default)]
pub struct EmpiricalMatrixBuilder;

impl EmpiricalMatrixBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self
    }

    /// Group row indices by (symbol, exchange), each group in timestamp order.
    ///
    /// The sort is stable, so quotes sharing a timestamp keep their input order.
    fn partitions(quotes: &[CleanedQuote]) -> BTreeMap<(&str, &str), Vec<usize>> {
        let mut groups: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
        for (i, q) in quotes.iter().enumerate() {
            groups
                .entry((q.symbol.as_str(), q.exchange.as_str()))
                .or_default()
                .push(i);
        }
        for rows in groups.values_mut() {
            rows.sort_by_key(|&i| quotes[i].ts);
        }
        groups
    }

    /// Build U and D from one symbol's cleaned quotes.
    pub fn build(&self, quotes: &[CleanedQuote]) -> EmpiricalMatrices {
        let bid_sizes: Vec<f64> = quotes.iter().map(|q| q.bid_size).collect();
        let ask_sizes: Vec<f64> = quotes.iter().map(|q| q.ask_size).collect();
        let bid_deciles = assign_deciles(&bid_sizes);
        let ask_deciles = assign_deciles(&ask_sizes);

        let mut counts = CellCounts::default();
        for rows in Self::partitions(quotes).values() {
            for pair in rows.windows(2) {
                let (cur, next) = (pair[0], pair[1]);
                let (Some(bid_dec), Some(ask_dec)) = (bid_deciles[cur], ask_deciles[cur]) else {
                    continue;
                };
                // Unchanged and falling mids both count as "not up".
                let up = quotes[next].mid() - quotes[cur].mid() > 0.0;
                counts.add(bid_dec as usize, ask_dec as usize, up);
            }
        }

        let total = counts.total();
        let u = DecileGrid::from_fn(|i, j| {
            let n = counts.count[i - 1][j - 1];
            if n == 0 {
                0.0
            } else {
                counts.ups[i - 1][j - 1] as f64 / n as f64
            }
        });
        let d = DecileGrid::from_fn(|i, j| {
            if total == 0 {
                0.0
            } else {
                counts.count[i - 1][j - 1] as f64 / total as f64
            }
        });

        debug!(rows = quotes.len(), observations = total, "built empirical matrices");

        EmpiricalMatrices {
            u,
            d,
            observations: total as usize,
        }
    }
}
