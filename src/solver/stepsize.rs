use crate::algebra::*;
use crate::solver::SettingsError;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Tuning coefficients of the adaptive stepsize rule.
///
/// After a step with displacement `(dx, dy)` the admissible stepsize
/// limit is `movement / interaction`.  Accepted or not, the next
/// candidate stepsize is
///
/// ```text
/// min( limit*(1 - (k+1)^(-reduction_exponent)),
///      step*(1 + (k+1)^(-growth_exponent)) )
/// ```
///
/// where `k` counts step attempts, so both the contraction toward the
/// limit and the expansion away from it decay as the iteration
/// progresses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdaptiveStepsizeParameters<T: FloatT> {
    ///exponent of the contraction applied on rejected steps, in (0,1)
    pub reduction_exponent: T,
    ///exponent of the growth applied on accepted steps, in (0,1)
    pub growth_exponent: T,
}

impl<T: FloatT> Default for AdaptiveStepsizeParameters<T> {
    fn default() -> Self {
        Self {
            reduction_exponent: (0.3).as_T(),
            growth_exponent: (0.6).as_T(),
        }
    }
}

impl<T: FloatT> AdaptiveStepsizeParameters<T> {
    /// Construct validated stepsize parameters.
    pub fn new(reduction_exponent: T, growth_exponent: T) -> Result<Self, SettingsError> {
        let params = Self {
            reduction_exponent,
            growth_exponent,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check that both coefficients lie strictly inside (0,1).
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.reduction_exponent > T::zero() && self.reduction_exponent < T::one()) {
            return Err(SettingsError::BadFieldValue("reduction_exponent"));
        }
        if !(self.growth_exponent > T::zero() && self.growth_exponent < T::one()) {
            return Err(SettingsError::BadFieldValue("growth_exponent"));
        }
        Ok(())
    }
}

#[test]
fn test_stepsize_validate() {
    assert!(AdaptiveStepsizeParameters::<f64>::default()
        .validate()
        .is_ok());
    assert!(AdaptiveStepsizeParameters::new(0.3, 0.0).is_err());
    assert!(AdaptiveStepsizeParameters::new(1.0, 0.6).is_err());
    assert!(AdaptiveStepsizeParameters::new(0.999, 1e-6).is_ok());
}
