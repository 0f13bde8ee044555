use crate::algebra::*;
use crate::solver::{AdaptiveStepsizeParameters, RestartParameters, TerminationCriteria};
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field value is outside its allowed range
    #[error("bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// Aggregate solver configuration.
///
/// Collects the scalar preprocessing and reporting knobs together with
/// the three policy objects ([`TerminationCriteria`],
/// [`RestartParameters`], [`AdaptiveStepsizeParameters`]) into one
/// immutable configuration.  Construction through
/// [`PdhgSettingsBuilder`] validates every range before the solver can
/// be invoked, so bad input fails fast rather than being diagnosed by
/// the iteration.

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PdhgSettings<T: FloatT> {
    ///number of L∞ Ruiz rescaling passes applied before solving
    #[builder(default = "10")]
    pub l_inf_ruiz_iterations: u32,

    ///apply one pass of L2 norm rescaling after the Ruiz passes
    #[builder(default = "false")]
    pub l2_norm_rescaling: bool,

    ///exponent of the Pock-Chambolle rescaling pass, in [0,2].
    ///`None` disables the pass entirely
    #[builder(default = "Some(T::one())")]
    pub pock_chambolle_alpha: Option<T>,

    ///scales the initial primal weight; larger values favor reducing
    ///the primal infeasibility early
    #[builder(default = "T::one()")]
    pub primal_importance: T,

    ///derive the initial primal weight from the objective and right
    ///hand side norms rather than using `primal_importance` alone
    #[builder(default = "true")]
    pub scale_invariant_initial_primal_weight: bool,

    ///printing level: 1 = final summary only, 2 = also setup and
    ///restart reports, 3 = also a row per termination evaluation
    #[builder(default = "2")]
    pub verbosity: u32,

    ///capture per-evaluation statistics on the solve result
    #[builder(default = "false")]
    pub record_iteration_stats: bool,

    ///termination checks are performed every this many iterations
    #[builder(default = "64")]
    pub termination_evaluation_frequency: u32,

    ///convergence and resource thresholds
    #[builder(default)]
    pub termination: TerminationCriteria<T>,

    ///restart policy
    #[builder(default)]
    pub restart: RestartParameters<T>,

    ///adaptive stepsize policy
    #[builder(default)]
    pub stepsize: AdaptiveStepsizeParameters<T>,
}

impl<T> Default for PdhgSettings<T>
where
    T: FloatT,
{
    fn default() -> PdhgSettings<T> {
        PdhgSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> PdhgSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid, including the nested policy
    /// objects.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_verbosity(self.verbosity)?;
        validate_evaluation_frequency(self.termination_evaluation_frequency)?;
        validate_primal_importance(self.primal_importance)?;
        validate_pock_chambolle_alpha(self.pock_chambolle_alpha)?;

        self.termination.validate()?;
        self.restart.validate()?;
        self.stepsize.validate()?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for PdhgSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        PdhgSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> PdhgSettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), SettingsError> {
        if let Some(v) = self.verbosity {
            validate_verbosity(v)?;
        }
        if let Some(f) = self.termination_evaluation_frequency {
            validate_evaluation_frequency(f)?;
        }
        if let Some(p) = self.primal_importance {
            validate_primal_importance(p)?;
        }
        if let Some(alpha) = self.pock_chambolle_alpha {
            validate_pock_chambolle_alpha(alpha)?;
        }
        if let Some(ref termination) = self.termination {
            termination.validate()?;
        }
        if let Some(ref restart) = self.restart {
            restart.validate()?;
        }
        if let Some(ref stepsize) = self.stepsize {
            stepsize.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_verbosity(verbosity: u32) -> Result<(), SettingsError> {
    if (1..=3).contains(&verbosity) {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("verbosity"))
    }
}

fn validate_evaluation_frequency(frequency: u32) -> Result<(), SettingsError> {
    if frequency > 0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(
            "termination_evaluation_frequency",
        ))
    }
}

fn validate_primal_importance<T: FloatT>(primal_importance: T) -> Result<(), SettingsError> {
    if primal_importance > T::zero() && primal_importance.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("primal_importance"))
    }
}

fn validate_pock_chambolle_alpha<T: FloatT>(alpha: Option<T>) -> Result<(), SettingsError> {
    match alpha {
        // both induced exponents (α and 2-α) must stay nonnegative
        Some(a) if !(a >= T::zero() && a <= (2.0).as_T()) => {
            Err(SettingsError::BadFieldValue("pock_chambolle_alpha"))
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------
// settings file round trip
// ---------------------------------------------------------

#[cfg(feature = "serde")]
impl<T> PdhgSettings<T>
where
    T: FloatT + Serialize + DeserializeOwned,
{
    /// Write the settings to `file` as JSON.
    ///
    /// Non-finite values are replaced with sentinels that JSON can
    /// carry; [`read_from_file`](Self::read_from_file) restores them.
    pub fn write_to_file(&self, file: &mut std::fs::File) -> Result<(), std::io::Error> {
        use std::io::Write;

        let mut json_settings = self.clone();
        sanitize_settings(&mut json_settings);

        let json = serde_json::to_string(&json_settings)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Read settings from a JSON `file`, restoring sanitized values and
    /// validating the result.
    pub fn read_from_file(file: &mut std::fs::File) -> Result<Self, std::io::Error> {
        use std::io::Read;

        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut settings: PdhgSettings<T> = serde_json::from_str(&buffer)?;
        desanitize_settings(&mut settings);

        settings
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(settings)
    }
}

// sanitize settings to remove values that can't be serialized, i.e. infs

#[cfg(feature = "serde")]
fn sanitize_settings<T: FloatT>(settings: &mut PdhgSettings<T>) {
    if settings.termination.time_sec_limit == f64::INFINITY {
        settings.termination.time_sec_limit = f64::MAX;
    }
}

#[cfg(feature = "serde")]
fn desanitize_settings<T: FloatT>(settings: &mut PdhgSettings<T>) {
    if settings.termination.time_sec_limit == f64::MAX {
        settings.termination.time_sec_limit = f64::INFINITY;
    }
}

// ---------------------------------------------------------

#[test]
fn test_settings_validate() {
    // all standard settings
    PdhgSettingsBuilder::<f64>::default().build().unwrap();

    // fail on out of range verbosity
    assert!(PdhgSettingsBuilder::<f64>::default()
        .verbosity(0)
        .build()
        .is_err());
    assert!(PdhgSettingsBuilder::<f64>::default()
        .verbosity(4)
        .build()
        .is_err());
    assert!(PdhgSettingsBuilder::<f64>::default()
        .verbosity(3)
        .build()
        .is_ok());

    // fail on zero evaluation frequency
    assert!(PdhgSettingsBuilder::<f64>::default()
        .termination_evaluation_frequency(0)
        .build()
        .is_err());

    // fail on nonpositive primal importance
    assert!(PdhgSettingsBuilder::<f64>::default()
        .primal_importance(0.0)
        .build()
        .is_err());

    // fail on out of range Pock-Chambolle exponent
    assert!(PdhgSettingsBuilder::<f64>::default()
        .pock_chambolle_alpha(Some(3.0))
        .build()
        .is_err());
    assert!(PdhgSettingsBuilder::<f64>::default()
        .pock_chambolle_alpha(None)
        .build()
        .is_ok());

    // bad nested policy values are rejected before build
    let mut restart = crate::solver::RestartParameters::<f64>::default();
    restart.sufficient_reduction_for_restart = 1.5;
    assert!(PdhgSettingsBuilder::<f64>::default()
        .restart(restart)
        .build()
        .is_err());

    let mut stepsize = crate::solver::AdaptiveStepsizeParameters::<f64>::default();
    stepsize.growth_exponent = 1.0;
    assert!(PdhgSettingsBuilder::<f64>::default()
        .stepsize(stepsize)
        .build()
        .is_err());

    // boundary-interior values are accepted
    let mut restart = crate::solver::RestartParameters::<f64>::default();
    restart.sufficient_reduction_for_restart = 1e-9;
    restart.necessary_reduction_for_restart = 1.0 - 1e-9;
    assert!(PdhgSettingsBuilder::<f64>::default()
        .restart(restart)
        .build()
        .is_ok());

    // directly construct bad settings and manually check
    let settings = PdhgSettings::<f64> {
        verbosity: 17,
        ..PdhgSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_json_round_trip() {
    use std::io::{Seek, SeekFrom};

    let settings = PdhgSettingsBuilder::<f64>::default()
        .verbosity(1)
        .l2_norm_rescaling(true)
        .build()
        .unwrap();

    // infinite time limit survives the sanitize/desanitize round trip
    assert_eq!(settings.termination.time_sec_limit, f64::INFINITY);

    let mut file = tempfile::tempfile().unwrap();
    settings.write_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let settings2 = PdhgSettings::<f64>::read_from_file(&mut file).unwrap();

    assert_eq!(settings2.verbosity, 1);
    assert!(settings2.l2_norm_rescaling);
    assert_eq!(settings2.termination, settings.termination);
    assert_eq!(settings2.restart, settings.restart);
    assert_eq!(settings2.stepsize, settings.stepsize);
}
