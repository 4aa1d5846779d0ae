use std::{fmt, sync::Arc};

use crate::State;

use super::{Criterion, Error, EventCondition, Predicate};

/// Turns a predicate on the state into a condition.
///
/// The predicate maps to `+1` when true and `-1` when false (swapped when
/// `inverse` is set), so crossing criteria fire when the predicate flips.
#[derive(Clone)]
pub struct BooleanCondition {
    name: String,
    criterion: Criterion,
    predicate: Predicate,
    inverse: bool,
}

impl BooleanCondition {
    pub fn new<F>(name: impl Into<String>, criterion: Criterion, predicate: F, inverse: bool) -> Self
    where
        F: Fn(&State) -> Result<bool, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            criterion,
            predicate: Arc::new(predicate),
            inverse,
        }
    }

    #[must_use]
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    #[must_use]
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }
}

impl EventCondition for BooleanCondition {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, state: &State) -> Result<f64, Error> {
        let value = (self.predicate)(state)? != self.inverse;
        Ok(if value { 1.0 } else { -1.0 })
    }

    fn is_satisfied(&self, current: &State, previous: &State) -> Result<bool, Error> {
        let current = self.evaluate(current)?;
        let previous = self.evaluate(previous)?;
        Ok(self.criterion.is_satisfied(current, previous, 0.0))
    }

    fn update_target(&mut self, _initial: &State) -> Result<(), Error> {
        Ok(())
    }
}

impl fmt::Debug for BooleanCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanCondition")
            .field("name", &self.name)
            .field("criterion", &self.criterion)
            .field("inverse", &self.inverse)
            .finish_non_exhaustive()
    }
}
