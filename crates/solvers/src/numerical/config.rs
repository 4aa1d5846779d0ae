use thiserror::Error;
use uom::si::{f64::Time, time::second};

use crate::root;

/// The explicit Runge-Kutta scheme used for stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepperType {
    /// Classic fourth-order scheme with a fixed step.
    RungeKutta4,

    /// Cash-Karp 5(4) embedded pair.
    RungeKuttaCashKarp54,

    /// Dormand-Prince 5(4) embedded pair.
    #[default]
    RungeKuttaDopri5,
}

impl StepperType {
    /// Whether the stepper adapts its step to an error estimate.
    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        !matches!(self, Self::RungeKutta4)
    }
}

/// Configuration for the numerical solver.
///
/// `time_step` is the fixed step of [`StepperType::RungeKutta4`] and the
/// first trial step of the adaptive steppers, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    stepper: StepperType,
    time_step: f64,
    relative_tolerance: f64,
    absolute_tolerance: f64,
    root_solver: root::Config,
}

/// Errors that can occur when validating a numerical solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("time_step must be finite and positive")]
    TimeStep,

    #[error("relative_tolerance must be finite and positive")]
    RelativeTolerance,

    #[error("absolute_tolerance must be finite and positive")]
    AbsoluteTolerance,

    #[error("root solver: {0}")]
    RootSolver(#[from] root::ConfigError),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stepper: StepperType::RungeKuttaDopri5,
            time_step: 5.0,
            relative_tolerance: 1e-12,
            absolute_tolerance: 1e-12,
            root_solver: root::Config::default(),
        }
    }
}

impl Config {
    /// Creates a config with the default root solver settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the step or a tolerance is not finite and positive.
    pub fn new(
        stepper: StepperType,
        time_step: Time,
        relative_tolerance: f64,
        absolute_tolerance: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            stepper,
            time_step: time_step.get::<second>(),
            relative_tolerance,
            absolute_tolerance,
            root_solver: root::Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the root solver settings used to locate events.
    #[must_use]
    pub fn with_root_solver(self, root_solver: root::Config) -> Self {
        Self {
            root_solver,
            ..self
        }
    }

    /// Checks a config that did not come through [`Config::new`], such as one
    /// deserialized from a file.
    ///
    /// # Errors
    ///
    /// See [`Config::new`]. The root solver settings are checked too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::TimeStep);
        }
        if !self.relative_tolerance.is_finite() || self.relative_tolerance <= 0.0 {
            return Err(ConfigError::RelativeTolerance);
        }
        if !self.absolute_tolerance.is_finite() || self.absolute_tolerance <= 0.0 {
            return Err(ConfigError::AbsoluteTolerance);
        }
        self.root_solver.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn stepper(&self) -> StepperType {
        self.stepper
    }

    #[must_use]
    pub fn time_step(&self) -> Time {
        Time::new::<second>(self.time_step)
    }

    #[must_use]
    pub fn relative_tolerance(&self) -> f64 {
        self.relative_tolerance
    }

    #[must_use]
    pub fn absolute_tolerance(&self) -> f64 {
        self.absolute_tolerance
    }

    #[must_use]
    pub fn root_solver(&self) -> &root::Config {
        &self.root_solver
    }

    pub(super) fn time_step_seconds(&self) -> f64 {
        self.time_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_values() {
        let step = Time::new::<second>(1.0);

        assert_eq!(
            Config::new(StepperType::RungeKutta4, Time::new::<second>(0.0), 1e-9, 1e-9),
            Err(ConfigError::TimeStep)
        );
        assert_eq!(
            Config::new(StepperType::RungeKuttaDopri5, step, -1.0, 1e-9),
            Err(ConfigError::RelativeTolerance)
        );
        assert_eq!(
            Config::new(StepperType::RungeKuttaDopri5, step, 1e-9, f64::INFINITY),
            Err(ConfigError::AbsoluteTolerance)
        );
        assert!(Config::default().validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_toml() {
        let config: Config = toml::from_str(
            r#"
            stepper = "RungeKuttaCashKarp54"
            time_step = 10.0
            relative_tolerance = 1e-10

            [root_solver]
            max_iters = 60
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.stepper(), StepperType::RungeKuttaCashKarp54);
        assert_eq!(config.time_step().get::<second>(), 10.0);
        assert_eq!(config.relative_tolerance(), 1e-10);
        assert_eq!(config.absolute_tolerance(), 1e-12);
        assert_eq!(config.root_solver().max_iters(), 60);
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_configs_still_validate() {
        let config: Config = toml::from_str("time_step = -1.0").expect("valid toml");

        assert_eq!(config.validate(), Err(ConfigError::TimeStep));
    }
}
