//! Configuration structures for the hidden liquidity estimator.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for an estimation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quote cleaning configuration.
    pub cleaning: CleaningConfig,
    /// Parameter fit configuration.
    pub fit: FitConfig,
}

impl Config {
    /// Parse a (possibly partial) JSON configuration; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;
        self.fit.validate()
    }
}

/// Quote cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Exchange codes kept by the cleaner.
    pub allowed_exchanges: Vec<String>,
    /// First time of day kept (inclusive).
    pub session_start: NaiveTime,
    /// Last time of day kept (inclusive).
    pub session_end: NaiveTime,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            allowed_exchanges: vec!["T".to_string(), "P".to_string(), "Z".to_string()],
            session_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            session_end: NaiveTime::from_hms_opt(15, 59, 59).unwrap_or_default(),
        }
    }
}

impl CleaningConfig {
    fn validate(&self) -> Result<()> {
        if self.allowed_exchanges.is_empty() {
            return Err(Error::config("allowed_exchanges must not be empty"));
        }
        if self.session_start > self.session_end {
            return Err(Error::config(format!(
                "session_start {} is after session_end {}",
                self.session_start, self.session_end
            )));
        }
        Ok(())
    }
}

/// Bounded fit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Lower bound of the hidden liquidity search interval.
    pub h_lower: f64,
    /// Upper bound of the hidden liquidity search interval.
    pub h_upper: f64,
    /// Absolute tolerance on h.
    pub xatol: f64,
    /// Maximum number of loss evaluations.
    pub max_evaluations: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            h_lower: 0.001,
            h_upper: 20.0,
            xatol: 1e-5,
            max_evaluations: 500,
        }
    }
}

impl FitConfig {
    fn validate(&self) -> Result<()> {
        if !(self.h_lower.is_finite() && self.h_upper.is_finite()) {
            return Err(Error::config("h bounds must be finite"));
        }
        // The model denominator is only guaranteed positive for h >= 0.
        if self.h_lower < 0.0 {
            return Err(Error::config(format!("h_lower must be >= 0, got {}", self.h_lower)));
        }
        if self.h_lower >= self.h_upper {
            return Err(Error::config(format!(
                "h_lower {} must be below h_upper {}",
                self.h_lower, self.h_upper
            )));
        }
        if self.xatol.is_nan() || self.xatol <= 0.0 {
            return Err(Error::config("xatol must be positive"));
        }
        if self.max_evaluations == 0 {
            return Err(Error::config("max_evaluations must be at least 1"));
        }
        Ok(())
    }
}
