//! Engine configuration.

use serde::{Deserialize, Serialize};
use tessera_math::{MissingPolicy, ScanPolicy, SumMethod};
use tessera_primitives::BDAYS_IN_1Y;

use crate::EngineError;

/// Configuration for session computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Factor applied to covariances (periods per year).
    pub annualization: f64,
    /// Last-valid scan strategy.
    pub scan_policy: ScanPolicy,
    /// Rolling-sum kernel.
    pub sum_method: SumMethod,
    /// Gap treatment before resampling.
    pub missing_policy: MissingPolicy,
    /// Shortest leading window emitted by rolling operations (capped at the
    /// window length).
    pub min_periods: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annualization: f64::from(BDAYS_IN_1Y),
            scan_policy: ScanPolicy::default(),
            sum_method: SumMethod::default(),
            missing_policy: MissingPolicy::default(),
            min_periods: None,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for unusable values.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` for a non-positive annualization
    /// factor or a zero `min_periods`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.annualization.is_finite() && self.annualization > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "annualization must be positive, got {}",
                self.annualization
            )));
        }
        if self.min_periods == Some(0) {
            return Err(EngineError::InvalidConfig("min_periods must be positive".to_string()));
        }
        Ok(())
    }
}
