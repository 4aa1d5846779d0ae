use std::sync::Arc;

use crate::State;

use super::{Criterion, Error, EventCondition, Target, scalar::Scalar};

/// Compares an angle of the state, in radians, with a target angle.
///
/// Crossings are detected across the `±π` wrap-around, and a
/// [`Criterion::WithinRange`] range may straddle it (`lower = 3π/2`,
/// `upper = 5π/2` covers angles near zero).
#[derive(Debug, Clone)]
pub struct AngularCondition {
    inner: Scalar,
}

impl AngularCondition {
    /// Creates a condition from an angle evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the criterion is a range with
    /// non-finite or reversed bounds.
    pub fn new<F>(
        name: impl Into<String>,
        criterion: Criterion,
        evaluator: F,
        target: Target,
    ) -> Result<Self, Error>
    where
        F: Fn(&State) -> Result<f64, Error> + Send + Sync + 'static,
    {
        let inner = Scalar::new(name.into(), criterion, Arc::new(evaluator), target)?;
        Ok(Self { inner })
    }

    /// Satisfied while the angle lies in `[lower, upper]`, modulo a full turn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] for non-finite or reversed bounds.
    pub fn within_range<F>(
        name: impl Into<String>,
        evaluator: F,
        lower: f64,
        upper: f64,
    ) -> Result<Self, Error>
    where
        F: Fn(&State) -> Result<f64, Error> + Send + Sync + 'static,
    {
        Self::new(
            name,
            Criterion::WithinRange { lower, upper },
            evaluator,
            Target::absolute(0.0),
        )
    }

    #[must_use]
    pub fn criterion(&self) -> Criterion {
        self.inner.criterion
    }

    #[must_use]
    pub fn target(&self) -> Target {
        self.inner.target
    }
}

impl EventCondition for AngularCondition {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn evaluate(&self, state: &State) -> Result<f64, Error> {
        self.inner.evaluate(state)
    }

    fn is_satisfied(&self, current: &State, previous: &State) -> Result<bool, Error> {
        let [current, previous, target] = self.inner.samples(current, previous)?;
        Ok(self
            .inner
            .criterion
            .is_satisfied_angular(current, previous, target))
    }

    fn update_target(&mut self, initial: &State) -> Result<(), Error> {
        self.inner.update_target(initial)
    }
}
