use std::sync::Arc;

use uom::si::{f64::Time, time::second};

use crate::{CoordinateSubset, Instant, State};

use super::{Criterion, Error, EventCondition, Target, scalar::Scalar};

/// Compares a real scalar of the state with a target.
#[derive(Debug, Clone)]
pub struct RealCondition {
    inner: Scalar,
}

impl RealCondition {
    /// Creates a condition from an evaluator.
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

    /// Satisfied once `duration` has elapsed since the starting state.
    #[must_use]
    pub fn duration(criterion: Criterion, duration: Time) -> Self {
        Self::from_instant_evaluator(
            "duration",
            criterion,
            Target::relative(duration.get::<second>()),
        )
    }

    /// Satisfied at `instant`.
    #[must_use]
    pub fn instant(criterion: Criterion, instant: Instant) -> Self {
        Self::from_instant_evaluator(
            "instant",
            criterion,
            Target::absolute(instant.j2000_seconds()),
        )
    }

    /// Compares one element of a coordinate subset with a target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is not within the subset,
    /// or [`Error::InvalidRange`] for a malformed range criterion.
    pub fn coordinate(
        name: impl Into<String>,
        criterion: Criterion,
        subset: Arc<CoordinateSubset>,
        index: usize,
        target: Target,
    ) -> Result<Self, Error> {
        let name = name.into();
        if index >= subset.size() {
            return Err(Error::IndexOutOfRange {
                condition: name,
                subset: subset.name().to_owned(),
                index,
                size: subset.size(),
            });
        }

        Self::new(
            name,
            criterion,
            move |state: &State| Ok(state.extract_coordinate(&subset)?[index]),
            target,
        )
    }

    fn from_instant_evaluator(name: &str, criterion: Criterion, target: Target) -> Self {
        Self {
            inner: Scalar {
                name: name.to_owned(),
                criterion,
                evaluator: Arc::new(instant_seconds),
                target,
            },
        }
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

impl EventCondition for RealCondition {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn evaluate(&self, state: &State) -> Result<f64, Error> {
        self.inner.evaluate(state)
    }

    fn is_satisfied(&self, current: &State, previous: &State) -> Result<bool, Error> {
        let [current, previous, target] = self.inner.samples(current, previous)?;
        Ok(self.inner.criterion.is_satisfied(current, previous, target))
    }

    fn update_target(&mut self, initial: &State) -> Result<(), Error> {
        self.inner.update_target(initial)
    }
}

fn instant_seconds(state: &State) -> Result<f64, Error> {
    Ok(state.instant().j2000_seconds())
}
