use std::sync::Arc;

use tether_core::{
    CoordinateSubset, Dynamics, Instant, State,
    dynamics::{Aggregator, STANDARD_GRAVITY},
};
use tether_solvers::NumericalSolver;
use uom::si::{
    f64::{Mass, Time, Velocity},
    mass::kilogram,
    time::second,
    velocity::meter_per_second,
};

use super::{Error, SegmentKind};

/// The states a segment visited, from its initial state to the state where
/// its condition fired.
#[derive(Debug, Clone)]
pub struct Solution {
    name: String,
    kind: SegmentKind,
    dynamics: Vec<Arc<dyn Dynamics>>,
    states: Vec<State>,
    root_solver_has_converged: bool,
}

impl Solution {
    /// `states` is never empty: it holds at least the initial state.
    pub(super) fn new(
        name: String,
        kind: SegmentKind,
        dynamics: Vec<Arc<dyn Dynamics>>,
        states: Vec<State>,
        root_solver_has_converged: bool,
    ) -> Self {
        debug_assert!(!states.is_empty());
        Self {
            name,
            kind,
            dynamics,
            states,
            root_solver_has_converged,
        }
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
    pub fn dynamics(&self) -> &[Arc<dyn Dynamics>] {
        &self.dynamics
    }

    /// Every accepted sample, in time order, ending at the located event.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Whether locating the event converged to tolerance.
    #[must_use]
    pub fn root_solver_has_converged(&self) -> bool {
        self.root_solver_has_converged
    }

    #[must_use]
    pub fn initial_state(&self) -> &State {
        &self.states[0]
    }

    #[must_use]
    pub fn final_state(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    #[must_use]
    pub fn start_instant(&self) -> Instant {
        self.initial_state().instant()
    }

    #[must_use]
    pub fn end_instant(&self) -> Instant {
        self.final_state().instant()
    }

    #[must_use]
    pub fn propagation_duration(&self) -> Time {
        self.end_instant() - self.start_instant()
    }

    /// Propellant consumed over the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the states carry no mass.
    pub fn compute_delta_mass(&self) -> Result<Mass, Error> {
        let (initial, last) = self.masses()?;
        Ok(Mass::new::<kilogram>(initial - last))
    }

    /// Velocity change implied by the mass consumed, from the rocket
    /// equation `Δv = Isp·g₀·ln(m₀ / m₁)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the states carry no mass.
    pub fn compute_delta_v(&self, specific_impulse: Time) -> Result<Velocity, Error> {
        let (initial, last) = self.masses()?;
        let exhaust_speed = specific_impulse.get::<second>() * STANDARD_GRAVITY;
        Ok(Velocity::new::<meter_per_second>(
            exhaust_speed * (initial / last).ln(),
        ))
    }

    /// Re-propagates the segment's dynamics from its initial state to each of
    /// `instants`, returned in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstantOutOfSpan`] if an instant lies outside the
    /// segment, or an error if propagation fails.
    pub fn calculate_states_at(
        &self,
        instants: &[Instant],
        solver: &NumericalSolver,
    ) -> Result<Vec<State>, Error> {
        let (start, end) = (self.start_instant(), self.end_instant());
        if let Some(&instant) = instants
            .iter()
            .find(|&&instant| !(start <= instant && instant <= end))
        {
            return Err(Error::InstantOutOfSpan {
                instant,
                start,
                end,
            });
        }

        let equations = Aggregator::for_state(&self.dynamics, self.initial_state())?;
        let mut solver = solver.clone();
        solver.reset();
        Ok(solver.integrate_times(self.initial_state(), instants, &equations)?)
    }

    fn masses(&self) -> Result<(f64, f64), Error> {
        let mass = CoordinateSubset::mass();
        let initial = self.initial_state().extract_coordinate(&mass)?;
        let last = self.final_state().extract_coordinate(&mass)?;
        Ok((initial[0], last[0]))
    }
}
