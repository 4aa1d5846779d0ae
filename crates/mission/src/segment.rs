//! A single propagation run that ends at an event condition.
//!
//! A [`Segment`] owns the dynamics it propagates with, the condition that
//! ends it, and the solver settings. Solving a segment never mutates it: the
//! condition is cloned and its relative targets are resolved against the
//! segment's initial state, and the solver is cloned so every run starts from
//! the configured step size.
//!
//! Reaching the duration limit without the condition firing is an error.

mod error;
mod solution;

use std::sync::Arc;

use tether_core::{
    Condition, Dynamics, EventCondition, State,
    dynamics::{Aggregator, Thruster},
};
use tether_solvers::NumericalSolver;
use tracing::debug;
use uom::si::{f64::Time, time::second};

pub use error::Error;
pub use solution::Solution;

/// What a segment does, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    Coast,
    Maneuver,
}

#[derive(Debug, Clone)]
pub struct Segment {
    name: String,
    kind: SegmentKind,
    condition: Condition,
    dynamics: Vec<Arc<dyn Dynamics>>,
    solver: NumericalSolver,
}

impl Segment {
    /// A segment propagating under `dynamics` alone.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty or `dynamics` is.
    pub fn coast(
        name: impl Into<String>,
        condition: impl Into<Condition>,
        dynamics: Vec<Arc<dyn Dynamics>>,
        solver: NumericalSolver,
    ) -> Result<Self, Error> {
        Self::new(name.into(), SegmentKind::Coast, condition.into(), dynamics, solver)
    }

    /// A segment propagating under `dynamics` with `thruster` firing.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty.
    pub fn maneuver(
        name: impl Into<String>,
        condition: impl Into<Condition>,
        thruster: Thruster,
        dynamics: Vec<Arc<dyn Dynamics>>,
        solver: NumericalSolver,
    ) -> Result<Self, Error> {
        let mut dynamics = dynamics;
        dynamics.push(Arc::new(thruster));
        Self::new(
            name.into(),
            SegmentKind::Maneuver,
            condition.into(),
            dynamics,
            solver,
        )
    }

    fn new(
        name: String,
        kind: SegmentKind,
        condition: Condition,
        dynamics: Vec<Arc<dyn Dynamics>>,
        solver: NumericalSolver,
    ) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if dynamics.is_empty() {
            return Err(Error::NoDynamics { segment: name });
        }

        Ok(Self {
            name,
            kind,
            condition,
            dynamics,
            solver,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[must_use]
    pub fn dynamics(&self) -> &[Arc<dyn Dynamics>] {
        &self.dynamics
    }

    #[must_use]
    pub fn solver(&self) -> &NumericalSolver {
        &self.solver
    }

    /// Propagates `initial_state` until the condition fires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConditionNotSatisfied`] if `maximum_duration` elapses
    /// first, or an error if the dynamics do not fit the state or propagation
    /// fails.
    pub fn solve(&self, initial_state: &State, maximum_duration: Time) -> Result<Solution, Error> {
        let seconds = maximum_duration.get::<second>();
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(Error::InvalidDuration {
                segment: self.name.clone(),
                seconds,
            });
        }

        let mut condition = self.condition.clone();
        condition.update_target(initial_state)?;
        let equations = Aggregator::for_state(&self.dynamics, initial_state)?;
        let mut solver = self.solver.clone();

        debug!(
            segment = %self.name,
            kind = ?self.kind,
            start = %initial_state.instant(),
            max_duration = seconds,
            "solving segment"
        );

        let result = solver.integrate_until(
            initial_state,
            initial_state.instant() + maximum_duration,
            &equations,
            &condition,
        )?;

        if !result.condition_is_satisfied {
            return Err(Error::ConditionNotSatisfied {
                segment: self.name.clone(),
                condition: condition.name().to_owned(),
                seconds,
            });
        }

        debug!(
            segment = %self.name,
            end = %result.state.instant(),
            samples = result.states.len(),
            "segment solved"
        );

        Ok(Solution::new(
            self.name.clone(),
            self.kind,
            self.dynamics.clone(),
            result.states,
            result.root_solver_has_converged,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use tether_core::{
        CoordinateSubset, Frame, Instant, StateBuilder,
        condition::{Criterion, RealCondition},
        dynamics::{PositionDerivative, ThrustDirection},
    };
    use uom::si::{
        f64::{Force, Mass},
        force::newton,
        mass::kilogram,
        velocity::meter_per_second,
    };

    fn drifting_state() -> State {
        StateBuilder::new(
            Frame::gcrf(),
            [
                CoordinateSubset::cartesian_position(),
                CoordinateSubset::cartesian_velocity(),
                CoordinateSubset::mass(),
            ],
        )
        .expect("valid layout")
        .build(
            Instant::j2000(),
            DVector::from_vec(vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 100.0]),
        )
        .expect("valid width")
    }

    fn seconds(value: f64) -> Time {
        Time::new::<second>(value)
    }

    fn drift() -> Vec<Arc<dyn Dynamics>> {
        vec![Arc::new(PositionDerivative)]
    }

    #[test]
    fn coast_stops_after_the_duration() {
        let segment = Segment::coast(
            "drift",
            RealCondition::duration(Criterion::AnyCrossing, seconds(30.0)),
            drift(),
            NumericalSolver::default(),
        )
        .expect("valid segment");

        let solution = segment
            .solve(&drifting_state(), seconds(100.0))
            .expect("condition reachable");

        assert_eq!(solution.name(), "drift");
        assert_eq!(solution.kind(), SegmentKind::Coast);
        assert_relative_eq!(solution.propagation_duration().get::<second>(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(solution.final_state().coordinates()[0], 300.0, epsilon = 1e-6);
        assert_eq!(solution.initial_state(), &drifting_state());
    }

    #[test]
    fn unreachable_condition_is_an_error() {
        let segment = Segment::coast(
            "too long",
            RealCondition::duration(Criterion::AnyCrossing, seconds(30.0)),
            drift(),
            NumericalSolver::default(),
        )
        .expect("valid segment");

        assert!(matches!(
            segment.solve(&drifting_state(), seconds(1.0)),
            Err(Error::ConditionNotSatisfied { seconds, .. }) if seconds == 1.0
        ));
        assert!(matches!(
            segment.solve(&drifting_state(), seconds(0.0)),
            Err(Error::InvalidDuration { .. })
        ));
    }

    #[test]
    fn maneuver_burns_propellant() {
        let thruster = Thruster::new(
            Force::new::<newton>(10.0),
            seconds(300.0),
            Mass::new::<kilogram>(50.0),
            ThrustDirection::AlongVelocity,
        )
        .expect("valid thruster");
        let flow = thruster.mass_flow_rate();
        let segment = Segment::maneuver(
            "burn",
            RealCondition::duration(Criterion::AnyCrossing, seconds(60.0)),
            thruster,
            drift(),
            NumericalSolver::default(),
        )
        .expect("valid segment");

        let solution = segment
            .solve(&drifting_state(), seconds(600.0))
            .expect("condition reachable");

        assert_eq!(solution.kind(), SegmentKind::Maneuver);
        assert_eq!(solution.dynamics().len(), 2);
        let delta_mass = solution.compute_delta_mass().expect("mass present");
        assert_relative_eq!(delta_mass.get::<kilogram>(), flow * 60.0, max_relative = 1e-9);

        let delta_v = solution.compute_delta_v(seconds(300.0)).expect("mass present");
        let speed_gain = solution.final_state().coordinates()[3] - 10.0;
        assert_relative_eq!(delta_v.get::<meter_per_second>(), speed_gain, max_relative = 1e-6);
    }

    #[test]
    fn construction_is_validated() {
        let condition = RealCondition::duration(Criterion::AnyCrossing, seconds(1.0));

        assert!(matches!(
            Segment::coast(" ", condition.clone(), drift(), NumericalSolver::default()),
            Err(Error::EmptyName)
        ));
        assert!(matches!(
            Segment::coast("empty", condition, Vec::new(), NumericalSolver::default()),
            Err(Error::NoDynamics { .. })
        ));
    }

    #[test]
    fn dynamics_must_fit_the_state() {
        let subset = Arc::new(CoordinateSubset::new("x", 1).expect("valid subset"));
        let state = StateBuilder::new(Frame::gcrf(), [subset])
            .expect("valid layout")
            .build(Instant::j2000(), DVector::from_vec(vec![1.0]))
            .expect("valid width");
        let segment = Segment::coast(
            "drift",
            RealCondition::duration(Criterion::AnyCrossing, seconds(1.0)),
            drift(),
            NumericalSolver::default(),
        )
        .expect("valid segment");

        assert!(matches!(
            segment.solve(&state, seconds(10.0)),
            Err(Error::Dynamics(_))
        ));
    }

    #[test]
    fn resamples_within_the_span() {
        let segment = Segment::coast(
            "drift",
            RealCondition::duration(Criterion::AnyCrossing, seconds(20.0)),
            drift(),
            NumericalSolver::default(),
        )
        .expect("valid segment");
        let solution = segment
            .solve(&drifting_state(), seconds(100.0))
            .expect("condition reachable");

        let instants = [Instant::from_j2000_seconds(5.0), Instant::from_j2000_seconds(15.0)];
        let states = solution
            .calculate_states_at(&instants, segment.solver())
            .expect("inside the span");

        assert_relative_eq!(states[0].coordinates()[0], 50.0, epsilon = 1e-6);
        assert_relative_eq!(states[1].coordinates()[0], 150.0, epsilon = 1e-6);
        assert!(matches!(
            solution.calculate_states_at(&[Instant::from_j2000_seconds(25.0)], segment.solver()),
            Err(Error::InstantOutOfSpan { .. })
        ));
    }
}
