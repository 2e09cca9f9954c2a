//! PyO3 bindings for the hidden liquidity estimator.
//!
//! Exposes the Rust pipeline to Python:
//! - Full pipeline run on a quote CSV
//! - Parametric model matrix
//! - Weighted fit of `h` to user-supplied matrices

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use hliq_core::{DecileGrid, Error as RustError, FitConfig, FitResult as RustFitResult};
use hliq_estimation::{run_pipeline as rust_run_pipeline, HiddenLiquidityFitter};
use hliq_features::model_uij as rust_model_uij;

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Result of one hidden liquidity estimation.
#[pyclass]
#[derive(Clone)]
pub struct FitResult {
    #[pyo3(get)]
    pub symbol: String,
    #[pyo3(get)]
    pub implied_h: f64,
    #[pyo3(get)]
    pub loss: f64,
    /// Rows are bid deciles 1..10, columns ask deciles 1..10.
    #[pyo3(get)]
    pub u_empirical: Vec<Vec<f64>>,
    #[pyo3(get)]
    pub u_model: Vec<Vec<f64>>,
    #[pyo3(get)]
    pub d_weights: Vec<Vec<f64>>,
}

#[pymethods]
impl FitResult {
    /// True when no cell carried weight.
    #[getter]
    fn is_degenerate(&self) -> bool {
        self.d_weights.iter().flatten().sum::<f64>() == 0.0
    }

    fn __repr__(&self) -> String {
        format!(
            "FitResult(symbol={}, implied_h={:.4}, loss={:.6})",
            self.symbol, self.implied_h, self.loss
        )
    }
}

impl From<RustFitResult> for FitResult {
    fn from(r: RustFitResult) -> Self {
        FitResult {
            symbol: r.symbol,
            implied_h: r.implied_h,
            loss: r.loss,
            u_empirical: r.u_empirical.to_rows(),
            u_model: r.u_model.to_rows(),
            d_weights: r.d_weights.to_rows(),
        }
    }
}

fn to_py_err(err: RustError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn grid_from_py(name: &str, rows: &[Vec<f64>]) -> PyResult<DecileGrid> {
    DecileGrid::from_rows(rows)
        .ok_or_else(|| PyValueError::new_err(format!("{} must be a 10x10 grid", name)))
}

// ============================================================================
// Python-exposed Functions
// ============================================================================

/// Run the full pipeline on a quote CSV for one symbol.
#[pyfunction]
fn run_pipeline(quotes_csv: &str, symbol: &str) -> PyResult<FitResult> {
    rust_run_pipeline(quotes_csv, symbol)
        .map(FitResult::from)
        .map_err(to_py_err)
}

/// Model up-move probability matrix at `h`.
#[pyfunction]
fn model_uij(h: f64) -> Vec<Vec<f64>> {
    rust_model_uij(h).to_rows()
}

/// Fit `h` to an empirical matrix and weights; returns `(h, loss)`.
#[pyfunction]
fn fit_h(u_empirical: Vec<Vec<f64>>, d_weights: Vec<Vec<f64>>) -> PyResult<(f64, f64)> {
    let u = grid_from_py("u_empirical", &u_empirical)?;
    let d = grid_from_py("d_weights", &d_weights)?;
    let fit = HiddenLiquidityFitter::new(FitConfig::default()).fit(&u, &d);
    Ok((fit.h, fit.loss))
}

/// Python module definition.
#[pymodule]
fn hidden_liquidity_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<FitResult>()?;

    // Functions
    m.add_function(wrap_pyfunction!(run_pipeline, m)?)?;
    m.add_function(wrap_pyfunction!(model_uij, m)?)?;
    m.add_function(wrap_pyfunction!(fit_h, m)?)?;

    Ok(())
}
