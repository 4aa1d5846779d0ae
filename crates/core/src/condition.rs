//! Event conditions: predicates over consecutive state samples.
//!
//! An [`EventCondition`] reduces a [`State`] to a scalar and decides, from the
//! current and the previous sample, whether the event it describes has
//! happened. Integrators use conditions to stop propagation, then refine the
//! stopping point between samples.
//!
//! The provided conditions are plain values:
//!
//! - [`RealCondition`] compares a real scalar with a [`Target`]
//! - [`AngularCondition`] does the same for an angle, across wrap-around
//! - [`BooleanCondition`] maps a predicate to `±1`
//! - [`LogicalCondition`] combines conditions with `And`/`Or`
//!
//! [`Condition`] wraps them in one cloneable enum.

mod angular;
mod boolean;
mod criterion;
mod error;
mod logical;
mod real;
mod scalar;
mod target;

use std::{fmt, sync::Arc};

use crate::State;

pub use angular::AngularCondition;
pub use boolean::BooleanCondition;
pub use criterion::Criterion;
pub use error::Error;
pub use logical::{LogicalCondition, LogicalKind};
pub use real::RealCondition;
pub use target::{Target, TargetKind};

/// Reduces a state to the scalar a condition compares.
pub type Evaluator = Arc<dyn Fn(&State) -> Result<f64, Error> + Send + Sync>;

/// Reduces a state to a boolean.
pub type Predicate = Arc<dyn Fn(&State) -> Result<bool, Error> + Send + Sync>;

/// A predicate over consecutive state samples.
pub trait EventCondition: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Reduces `state` to the scalar this condition compares.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be evaluated or if the condition
    /// has no scalar value.
    fn evaluate(&self, state: &State) -> Result<f64, Error>;

    /// Whether the event happened between `previous` and `current`.
    ///
    /// # Errors
    ///
    /// Returns an error if either state cannot be evaluated or a relative
    /// target was never resolved.
    fn is_satisfied(&self, current: &State, previous: &State) -> Result<bool, Error>;

    /// Captures the starting value of any relative target from `initial`.
    ///
    /// Calling it again replaces the earlier capture.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial` cannot be evaluated.
    fn update_target(&mut self, initial: &State) -> Result<(), Error>;
}

/// Any of the provided event conditions.
#[derive(Debug, Clone)]
pub enum Condition {
    Real(RealCondition),
    Angular(AngularCondition),
    Boolean(BooleanCondition),
    Logical(LogicalCondition),
}

impl EventCondition for Condition {
    fn name(&self) -> &str {
        match self {
            Self::Real(condition) => condition.name(),
            Self::Angular(condition) => condition.name(),
            Self::Boolean(condition) => condition.name(),
            Self::Logical(condition) => condition.name(),
        }
    }

    fn evaluate(&self, state: &State) -> Result<f64, Error> {
        match self {
            Self::Real(condition) => condition.evaluate(state),
            Self::Angular(condition) => condition.evaluate(state),
            Self::Boolean(condition) => condition.evaluate(state),
            Self::Logical(condition) => condition.evaluate(state),
        }
    }

    fn is_satisfied(&self, current: &State, previous: &State) -> Result<bool, Error> {
        match self {
            Self::Real(condition) => condition.is_satisfied(current, previous),
            Self::Angular(condition) => condition.is_satisfied(current, previous),
            Self::Boolean(condition) => condition.is_satisfied(current, previous),
            Self::Logical(condition) => condition.is_satisfied(current, previous),
        }
    }

    fn update_target(&mut self, initial: &State) -> Result<(), Error> {
        match self {
            Self::Real(condition) => condition.update_target(initial),
            Self::Angular(condition) => condition.update_target(initial),
            Self::Boolean(condition) => condition.update_target(initial),
            Self::Logical(condition) => condition.update_target(initial),
        }
    }
}

impl From<RealCondition> for Condition {
    fn from(condition: RealCondition) -> Self {
        Self::Real(condition)
    }
}

impl From<AngularCondition> for Condition {
    fn from(condition: AngularCondition) -> Self {
        Self::Angular(condition)
    }
}

impl From<BooleanCondition> for Condition {
    fn from(condition: BooleanCondition) -> Self {
        Self::Boolean(condition)
    }
}

impl From<LogicalCondition> for Condition {
    fn from(condition: LogicalCondition) -> Self {
        Self::Logical(condition)
    }
}
