use crate::State;

use super::{Condition, Error, EventCondition};

/// How a [`LogicalCondition`] combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKind {
    /// Satisfied when every child is. An empty list is satisfied.
    And,

    /// Satisfied when any child is. An empty list is never satisfied.
    Or,
}

/// Combines conditions.
///
/// Every child sees the same `(current, previous)` pair and every child is
/// evaluated, so the result does not depend on child order.
#[derive(Debug, Clone)]
pub struct LogicalCondition {
    name: String,
    kind: LogicalKind,
    conditions: Vec<Condition>,
}

impl LogicalCondition {
    pub fn new(name: impl Into<String>, kind: LogicalKind, conditions: Vec<Condition>) -> Self {
        Self {
            name: name.into(),
            kind,
            conditions,
        }
    }

    pub fn and(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self::new(name, LogicalKind::And, conditions)
    }

    pub fn or(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self::new(name, LogicalKind::Or, conditions)
    }

    #[must_use]
    pub fn kind(&self) -> LogicalKind {
        self.kind
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl EventCondition for LogicalCondition {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _state: &State) -> Result<f64, Error> {
        Err(Error::NotScalar {
            condition: self.name.clone(),
        })
    }

    fn is_satisfied(&self, current: &State, previous: &State) -> Result<bool, Error> {
        let outcomes = self
            .conditions
            .iter()
            .map(|condition| condition.is_satisfied(current, previous))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match self.kind {
            LogicalKind::And => outcomes.iter().all(|&satisfied| satisfied),
            LogicalKind::Or => outcomes.iter().any(|&satisfied| satisfied),
        })
    }

    fn update_target(&mut self, initial: &State) -> Result<(), Error> {
        self.conditions
            .iter_mut()
            .try_for_each(|condition| condition.update_target(initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::Time, time::second};

    use crate::condition::{Criterion, RealCondition, Target, fixtures::{mass, mass_state}};

    fn after_ten_seconds() -> Condition {
        RealCondition::duration(Criterion::PositiveCrossing, Time::new::<second>(10.0)).into()
    }

    fn below(limit: f64) -> Condition {
        RealCondition::coordinate(
            "mass",
            Criterion::StrictlyNegative,
            mass(),
            0,
            Target::absolute(limit),
        )
        .expect("index in range")
        .into()
    }

    #[test]
    fn and_requires_every_child() {
        let mut both = LogicalCondition::and("both", vec![after_ten_seconds(), below(50.0)]);
        both.update_target(&mass_state(0.0, 100.0)).expect("evaluable");

        let previous = mass_state(9.0, 60.0);
        assert!(!both.is_satisfied(&mass_state(11.0, 55.0), &previous).expect("ok"));
        assert!(both.is_satisfied(&mass_state(11.0, 45.0), &previous).expect("ok"));
    }

    #[test]
    fn or_requires_any_child() {
        let mut either = LogicalCondition::or("either", vec![after_ten_seconds(), below(50.0)]);
        either
            .update_target(&mass_state(0.0, 100.0))
            .expect("evaluable");

        let previous = mass_state(4.0, 60.0);
        assert!(!either.is_satisfied(&mass_state(5.0, 55.0), &previous).expect("ok"));
        assert!(either.is_satisfied(&mass_state(5.0, 45.0), &previous).expect("ok"));
    }

    #[test]
    fn targets_propagate_to_children() {
        let either = LogicalCondition::or("either", vec![after_ten_seconds()]);

        assert!(matches!(
            either.is_satisfied(&mass_state(11.0, 1.0), &mass_state(9.0, 1.0)),
            Err(Error::UnresolvedTarget { .. })
        ));
    }

    #[test]
    fn has_no_scalar_value() {
        let both = LogicalCondition::and("both", Vec::new());

        assert!(matches!(
            both.evaluate(&mass_state(0.0, 1.0)),
            Err(Error::NotScalar { .. })
        ));
        assert!(both.is_satisfied(&mass_state(0.0, 1.0), &mass_state(0.0, 1.0)).expect("ok"));
    }
}
