use std::fmt;

use crate::State;

use super::{Criterion, Error, Evaluator, Target, TargetKind};

/// The shared body of real and angular conditions.
#[derive(Clone)]
pub(super) struct Scalar {
    pub(super) name: String,
    pub(super) criterion: Criterion,
    pub(super) evaluator: Evaluator,
    pub(super) target: Target,
}

impl Scalar {
    pub(super) fn new(
        name: String,
        criterion: Criterion,
        evaluator: Evaluator,
        target: Target,
    ) -> Result<Self, Error> {
        if let Criterion::WithinRange { lower, upper } = criterion {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(Error::InvalidRange { lower, upper });
            }
        }

        Ok(Self {
            name,
            criterion,
            evaluator,
            target,
        })
    }

    pub(super) fn evaluate(&self, state: &State) -> Result<f64, Error> {
        (self.evaluator)(state)
    }

    /// Evaluates both samples and the resolved target, in that order.
    pub(super) fn samples(&self, current: &State, previous: &State) -> Result<[f64; 3], Error> {
        let target = self
            .target
            .resolved()
            .ok_or_else(|| Error::UnresolvedTarget {
                condition: self.name.clone(),
            })?;
        Ok([self.evaluate(current)?, self.evaluate(previous)?, target])
    }

    pub(super) fn update_target(&mut self, initial: &State) -> Result<(), Error> {
        if self.target.kind() == TargetKind::Relative {
            let offset = self.evaluate(initial)?;
            self.target.capture(offset);
        }
        Ok(())
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar")
            .field("name", &self.name)
            .field("criterion", &self.criterion)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
