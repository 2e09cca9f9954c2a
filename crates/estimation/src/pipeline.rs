//! Estimation pipeline.
//!
//! Sequences cleaning, symbol selection, matrix construction and the fit for
//! one symbol and assembles the [`FitResult`].

use crate::fitter::HiddenLiquidityFitter;
use hliq_core::{CleanedQuote, Config, Error, FitResult, RawQuote, Result};
use hliq_features::{model_uij, EmpiricalMatrixBuilder};
use hliq_ingestion::{load_quotes_csv, CleaningStats, QuoteCleaner};
use std::path::Path;
use tracing::{info, warn};

/// Rows of `cleaned` whose symbol equals `symbol` exactly.
pub fn select_symbol(cleaned: &[CleanedQuote], symbol: &str) -> Vec<CleanedQuote> {
    cleaned.iter().filter(|q| q.symbol == symbol).cloned().collect()
}

/// Hidden liquidity estimator for one symbol at a time.
pub struct Estimator {
    cleaner: QuoteCleaner,
    builder: EmpiricalMatrixBuilder,
    fitter: HiddenLiquidityFitter,
}

impl Estimator {
    /// Create an estimator from a configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: QuoteCleaner::new(config.cleaning),
            builder: EmpiricalMatrixBuilder::new(),
            fitter: HiddenLiquidityFitter::new(config.fit),
        })
    }

    /// Clean a raw quote table.
    pub fn clean(&self, raw: &[RawQuote]) -> (Vec<CleanedQuote>, CleaningStats) {
        self.cleaner.clean_with_stats(raw)
    }

    /// Estimate hidden liquidity for `symbol` from an already cleaned table.
    pub fn estimate(&self, cleaned: &[CleanedQuote], symbol: &str) -> Result<FitResult> {
        let selected = select_symbol(cleaned, symbol);
        if selected.is_empty() {
            return Err(Error::empty_selection(symbol));
        }

        let matrices = self.builder.build(&selected);
        if matrices.is_empty() {
            warn!(symbol, rows = selected.len(), "no quote pairs to tabulate, fit is degenerate");
        }

        let fit = self.fitter.fit(&matrices.u, &matrices.d);
        // Recomputed here rather than taken from inside the fit.
        let u_model = model_uij(fit.h);

        info!(
            symbol,
            rows = selected.len(),
            observations = matrices.observations,
            implied_h = fit.h,
            loss = fit.loss,
            "estimated hidden liquidity"
        );

        Ok(FitResult {
            symbol: symbol.to_string(),
            implied_h: fit.h,
            loss: fit.loss,
            u_empirical: matrices.u,
            u_model,
            d_weights: matrices.d,
        })
    }

    /// Clean a raw table and estimate hidden liquidity for `symbol`.
    pub fn estimate_raw(&self, raw: &[RawQuote], symbol: &str) -> Result<FitResult> {
        let (cleaned, _) = self.clean(raw);
        self.estimate(&cleaned, symbol)
    }

    /// Load, clean and estimate from a quote CSV file.
    pub fn estimate_csv(&self, path: impl AsRef<Path>, symbol: &str) -> Result<FitResult> {
        let raw = load_quotes_csv(path)?;
        self.estimate_raw(&raw, symbol)
    }
}

/// Run the full pipeline on a quote CSV with the default configuration.
pub fn run_pipeline(path: impl AsRef<Path>, symbol: &str) -> Result<FitResult> {
    Estimator::new(Config::default())?.estimate_csv(path, symbol)
}
