use crate::algebra::*;
use crate::solver::SettingsError;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Convergence and resource thresholds honored by the solve loop.
///
/// The iteration reports `Optimal` when, at a termination evaluation,
/// the primal residual, dual residual and duality gap all fall below
/// their absolute-plus-relative thresholds.  The iteration and time
/// caps bound the run regardless of convergence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerminationCriteria<T: FloatT> {
    ///absolute optimality tolerance
    pub eps_optimal_absolute: T,
    ///relative optimality tolerance
    pub eps_optimal_relative: T,
    ///maximum number of iterations
    pub iteration_limit: u32,
    ///maximum run time (seconds)
    pub time_sec_limit: f64,
}

impl<T: FloatT> Default for TerminationCriteria<T> {
    fn default() -> Self {
        Self {
            eps_optimal_absolute: (1e-6).as_T(),
            eps_optimal_relative: (1e-6).as_T(),
            iteration_limit: 100_000,
            time_sec_limit: f64::INFINITY,
        }
    }
}

impl<T: FloatT> TerminationCriteria<T> {
    /// Construct validated termination criteria.
    pub fn new(
        eps_optimal_absolute: T,
        eps_optimal_relative: T,
        iteration_limit: u32,
        time_sec_limit: f64,
    ) -> Result<Self, SettingsError> {
        let criteria = Self {
            eps_optimal_absolute,
            eps_optimal_relative,
            iteration_limit,
            time_sec_limit,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    /// Check that all thresholds are in range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.eps_optimal_absolute >= T::zero()) || !self.eps_optimal_absolute.is_finite() {
            return Err(SettingsError::BadFieldValue("eps_optimal_absolute"));
        }
        if !(self.eps_optimal_relative >= T::zero()) || !self.eps_optimal_relative.is_finite() {
            return Err(SettingsError::BadFieldValue("eps_optimal_relative"));
        }
        if !(self.time_sec_limit > 0.0) {
            return Err(SettingsError::BadFieldValue("time_sec_limit"));
        }
        Ok(())
    }
}

#[test]
fn test_termination_validate() {
    assert!(TerminationCriteria::<f64>::default().validate().is_ok());

    assert!(TerminationCriteria::new(-1e-6, 1e-6, 100, f64::INFINITY).is_err());
    assert!(TerminationCriteria::new(1e-6, f64::NAN, 100, f64::INFINITY).is_err());
    assert!(TerminationCriteria::new(1e-6, 1e-6, 100, 0.0).is_err());
    assert!(TerminationCriteria::new(0.0, 0.0, 0, 1.0).is_ok());
}
