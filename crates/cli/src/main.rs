//! Hidden liquidity CLI
//!
//! Estimates the hidden liquidity level of one symbol from a quote table:
//!
//! ```text
//! hidden-liquidity <QUOTES_CSV> <SYMBOL>
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use hliq_core::{DecileGrid, FitResult};
use hliq_estimation::run_pipeline;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Hidden liquidity quick run
#[derive(Parser)]
#[command(name = "hidden-liquidity")]
#[command(about = "Estimate the hidden liquidity level of a symbol from top-of-book quotes")]
#[command(version)]
struct Cli {
    /// Path to the quotes CSV
    quotes_csv: PathBuf,
    /// Ticker symbol such as AAPL
    symbol: String,
}

fn shape(grid: &DecileGrid) -> String {
    let (rows, cols) = grid.shape();
    format!("({}, {})", rows, cols)
}

fn report(result: &FitResult) -> String {
    format!(
        "symbol, {}\nimplied_h, {:.4}\nloss, {:.6}\nu_empirical shape, {}\nu_model shape, {}",
        result.symbol,
        result.implied_h,
        result.loss,
        shape(&result.u_empirical),
        shape(&result.u_model),
    )
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let result = run_pipeline(&cli.quotes_csv, &cli.symbol).with_context(|| {
        format!(
            "failed to estimate hidden liquidity for '{}' from {}",
            cli.symbol,
            cli.quotes_csv.display()
        )
    })?;

    println!("{}", report(&result));
    Ok(())
}
