use crate::algebra::*;
use crate::solver::SettingsError;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Policy governing when the iteration resets its extrapolation state.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RestartScheme {
    /// Never restart.
    NoRestarts,
    /// Restart every `frequency` iterations.
    FixedFrequency,
    /// Restart when the KKT merit of a candidate has decayed
    /// sufficiently since the last restart.
    AdaptiveKkt,
}

/// Which candidate point a restart jumps to.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RestartMetric {
    /// Always restart to the running average.
    Average,
    /// Greedily restart to whichever of the current iterate and the
    /// running average has the smaller KKT merit.
    GreedyKkt,
}

/// Parameters of the restart policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RestartParameters<T: FloatT> {
    ///restart scheme
    pub scheme: RestartScheme,
    ///restart point selection metric
    pub metric: RestartMetric,
    ///restart period, meaningful only for the fixed frequency scheme
    pub frequency: u32,
    ///fraction of all iterations since the last restart that forces an
    ///artificial restart
    pub artificial_restart_threshold: T,
    ///KKT merit decay that is sufficient to restart on its own
    pub sufficient_reduction_for_restart: T,
    ///KKT merit decay required before a restart is considered at all
    pub necessary_reduction_for_restart: T,
    ///smoothing applied to primal weight updates at restarts, in [0,1]
    pub primal_weight_update_smoothing: T,
}

impl<T: FloatT> Default for RestartParameters<T> {
    fn default() -> Self {
        Self {
            scheme: RestartScheme::AdaptiveKkt,
            metric: RestartMetric::GreedyKkt,
            frequency: 100,
            artificial_restart_threshold: (0.36).as_T(),
            sufficient_reduction_for_restart: (0.2).as_T(),
            necessary_reduction_for_restart: (0.8).as_T(),
            primal_weight_update_smoothing: (0.5).as_T(),
        }
    }
}

impl<T: FloatT> RestartParameters<T> {
    /// Construct validated restart parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scheme: RestartScheme,
        metric: RestartMetric,
        frequency: u32,
        artificial_restart_threshold: T,
        sufficient_reduction_for_restart: T,
        necessary_reduction_for_restart: T,
        primal_weight_update_smoothing: T,
    ) -> Result<Self, SettingsError> {
        let params = Self {
            scheme,
            metric,
            frequency,
            artificial_restart_threshold,
            sufficient_reduction_for_restart,
            necessary_reduction_for_restart,
            primal_weight_update_smoothing,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check that all parameters are in range.  Restart thresholds must
    /// lie strictly inside (0,1) with `necessary >= sufficient`, and the
    /// frequency must be positive for the fixed frequency scheme.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.scheme == RestartScheme::FixedFrequency && self.frequency == 0 {
            return Err(SettingsError::BadFieldValue("frequency"));
        }
        validate_open_unit_interval(
            self.artificial_restart_threshold,
            "artificial_restart_threshold",
        )?;
        validate_open_unit_interval(
            self.sufficient_reduction_for_restart,
            "sufficient_reduction_for_restart",
        )?;
        validate_open_unit_interval(
            self.necessary_reduction_for_restart,
            "necessary_reduction_for_restart",
        )?;
        if self.necessary_reduction_for_restart < self.sufficient_reduction_for_restart {
            return Err(SettingsError::BadFieldValue(
                "necessary_reduction_for_restart",
            ));
        }
        let smoothing = self.primal_weight_update_smoothing;
        if !(smoothing >= T::zero() && smoothing <= T::one()) {
            return Err(SettingsError::BadFieldValue(
                "primal_weight_update_smoothing",
            ));
        }
        Ok(())
    }
}

fn validate_open_unit_interval<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() && v < T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

#[test]
fn test_restart_validate() {
    assert!(RestartParameters::<f64>::default().validate().is_ok());

    // thresholds must be interior to (0,1)
    let mut params = RestartParameters::<f64>::default();
    params.sufficient_reduction_for_restart = 0.0;
    assert!(params.validate().is_err());
    params.sufficient_reduction_for_restart = 1.0;
    assert!(params.validate().is_err());
    params.sufficient_reduction_for_restart = 1e-10;
    assert!(params.validate().is_ok());

    // necessary >= sufficient
    let mut params = RestartParameters::<f64>::default();
    params.necessary_reduction_for_restart = 0.1;
    params.sufficient_reduction_for_restart = 0.5;
    assert!(params.validate().is_err());

    // fixed frequency needs a positive period
    let mut params = RestartParameters::<f64>::default();
    params.frequency = 0;
    assert!(params.validate().is_ok());
    params.scheme = RestartScheme::FixedFrequency;
    assert!(params.validate().is_err());

    assert!(RestartParameters::new(
        RestartScheme::FixedFrequency,
        RestartMetric::Average,
        40,
        0.5,
        0.2,
        0.9,
        1.0,
    )
    .is_ok());
}
