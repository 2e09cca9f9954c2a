//! Hidden liquidity fit.
//!
//! Finds the `h` that minimizes the weighted squared distance between the
//! model matrix and the empirical matrix:
//!
//! ```text
//! L(h) = mean over all 100 cells of (U(h)[i][j] - U[i][j])^2 * D[i][j]
//! ```
//!
//! The search is a bounded Brent minimization (golden-section steps with
//! parabolic interpolation) over `[h_lower, h_upper]`. The x tolerance and the
//! evaluation cap come from [`FitConfig`]; with the defaults (`1e-5`, 500) the
//! result is reproducible to well below the printed precision.
//!
//! When `D` is all zero the loss is identically zero: any `h` in the bounds is
//! a minimizer and the returned value carries no information.

use hliq_core::{DecileGrid, FitConfig, NUM_DECILES};
use hliq_features::model_uij;
use tracing::{debug, warn};

/// Outcome of a bounded scalar minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    /// Argument of the smallest value found.
    pub x: f64,
    /// Function value at `x`.
    pub fx: f64,
    /// Number of function evaluations.
    pub evaluations: u32,
    /// Whether the tolerance was met before the evaluation cap.
    pub converged: bool,
}

/// Bounded Brent minimizer for a function of one variable.
#[derive(Debug, Clone, Copy)]
pub struct BoundedBrent {
    xatol: f64,
    max_evaluations: u32,
}

impl BoundedBrent {
    /// Create a minimizer with absolute x tolerance and evaluation cap.
    pub fn new(xatol: f64, max_evaluations: u32) -> Self {
        Self {
            xatol,
            max_evaluations: max_evaluations.max(1),
        }
    }

    /// Minimize `f` over the closed interval `[lower, upper]`.
    pub fn minimize<F: FnMut(f64) -> f64>(&self, mut f: F, lower: f64, upper: f64) -> Minimum {
        let sqrt_eps = f64::EPSILON.sqrt();
        let golden_mean = 0.5 * (3.0 - 5.0_f64.sqrt());

        let (mut a, mut b) = (lower, upper);
        // x: best point so far, w: second best, v: previous value of w.
        let mut x = a + golden_mean * (b - a);
        let (mut w, mut v) = (x, x);
        let mut fx = f(x);
        let (mut fw, mut fv) = (fx, fx);
        let mut evaluations = 1u32;

        // d: current step, e: step before last.
        let mut d = 0.0_f64;
        let mut e = 0.0_f64;

        let mut xm = 0.5 * (a + b);
        let mut tol1 = sqrt_eps * x.abs() + self.xatol / 3.0;
        let mut tol2 = 2.0 * tol1;
        let mut converged = true;

        while (x - xm).abs() > tol2 - 0.5 * (b - a) {
            let mut golden = true;

            if e.abs() > tol1 {
                // Try a parabola through x, w and v.
                golden = false;
                let mut r = (x - w) * (fx - fv);
                let mut q = (x - v) * (fx - fw);
                let mut p = (x - v) * q - (x - w) * r;
                q = 2.0 * (q - r);
                if q > 0.0 {
                    p = -p;
                }
                q = q.abs();
                r = e;
                e = d;

                if p.abs() < (0.5 * q * r).abs() && p > q * (a - x) && p < q * (b - x) {
                    d = p / q;
                    let u = x + d;
                    // Do not evaluate too close to the bounds.
                    if (u - a) < tol2 || (b - u) < tol2 {
                        d = if xm >= x { tol1 } else { -tol1 };
                    }
                } else {
                    golden = true;
                }
            }

            if golden {
                e = if x >= xm { a - x } else { b - x };
                d = golden_mean * e;
            }

            let step = if d >= 0.0 { d.abs().max(tol1) } else { -d.abs().max(tol1) };
            let u = x + step;
            let fu = f(u);
            evaluations += 1;

            if fu <= fx {
                if u >= x {
                    a = x;
                } else {
                    b = x;
                }
                v = w;
                fv = fw;
                w = x;
                fw = fx;
                x = u;
                fx = fu;
            } else {
                if u < x {
                    a = u;
                } else {
                    b = u;
                }
                if fu <= fw || w == x {
                    v = w;
                    fv = fw;
                    w = u;
                    fw = fu;
                } else if fu <= fv || v == x || v == w {
                    v = u;
                    fv = fu;
                }
            }

            xm = 0.5 * (a + b);
            tol1 = sqrt_eps * x.abs() + self.xatol / 3.0;
            tol2 = 2.0 * tol1;

            if evaluations >= self.max_evaluations {
                converged = false;
                break;
            }
        }

        Minimum {
            x,
            fx,
            evaluations,
            converged,
        }
    }
}

/// Weighted mean squared error between the model at `h` and the empirical matrix.
pub fn weighted_loss(h: f64, u_empirical: &DecileGrid, d_weights: &DecileGrid) -> f64 {
    let model = model_uij(h);
    let total: f64 = model
        .cells()
        .zip(u_empirical.cells())
        .zip(d_weights.cells())
        .map(|((m, u), w)| (m - u).powi(2) * w)
        .sum();
    total / (NUM_DECILES * NUM_DECILES) as f64
}

/// Fitted hidden liquidity level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HFit {
    /// Minimizing `h`, inside the configured bounds.
    pub h: f64,
    /// Loss at `h`.
    pub loss: f64,
    /// Loss evaluations used.
    pub evaluations: u32,
    /// Whether the tolerance was met.
    pub converged: bool,
}

/// Weighted least-squares fitter for `h`.
pub struct HiddenLiquidityFitter {
    config: FitConfig,
}

impl HiddenLiquidityFitter {
    /// Create a new fitter.
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    /// Fit `h` to an empirical matrix and its weights.
    pub fn fit(&self, u_empirical: &DecileGrid, d_weights: &DecileGrid) -> HFit {
        let (lower, upper) = (self.config.h_lower, self.config.h_upper);
        let brent = BoundedBrent::new(self.config.xatol, self.config.max_evaluations);
        let min = brent.minimize(|h| weighted_loss(h, u_empirical, d_weights), lower, upper);

        let h = min.x.clamp(lower, upper);
        let loss = if h == min.x {
            min.fx
        } else {
            weighted_loss(h, u_empirical, d_weights)
        };

        if !min.converged {
            warn!(
                h,
                evaluations = min.evaluations,
                "hidden liquidity fit hit the evaluation cap before converging"
            );
        }
        debug!(h, loss, evaluations = min.evaluations, "fitted hidden liquidity");

        HFit {
            h,
            loss,
            evaluations: min.evaluations,
            converged: min.converged,
        }
    }
}

impl Default for HiddenLiquidityFitter {
    fn default() -> Self {
        Self::new(FitConfig::default())
    }
}
