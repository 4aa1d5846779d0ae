use tether_core::{Instant, State};
use uom::si::{
    f64::{Mass, Time, Velocity},
    mass::kilogram,
    time::second,
    velocity::meter_per_second,
};

use crate::segment;

/// The segment solutions a sequence produced, in order.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub segment_solutions: Vec<segment::Solution>,

    /// Unset when the sequence stopped on a failure.
    pub execution_is_complete: bool,
}

impl Solution {
    /// All states in time order, with each boundary shared by two segments
    /// listed once.
    #[must_use]
    pub fn states(&self) -> Vec<State> {
        let mut states = Vec::new();
        for (index, solution) in self.segment_solutions.iter().enumerate() {
            let skip = usize::from(index > 0);
            states.extend(solution.states().iter().skip(skip).cloned());
        }
        states
    }

    #[must_use]
    pub fn start_instant(&self) -> Option<Instant> {
        self.segment_solutions
            .first()
            .map(segment::Solution::start_instant)
    }

    #[must_use]
    pub fn end_instant(&self) -> Option<Instant> {
        self.segment_solutions
            .last()
            .map(segment::Solution::end_instant)
    }

    /// Zero when no segment was solved.
    #[must_use]
    pub fn propagation_duration(&self) -> Time {
        self.segment_solutions
            .iter()
            .map(segment::Solution::propagation_duration)
            .fold(Time::new::<second>(0.0), |total, duration| total + duration)
    }

    /// Propellant consumed over all segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the states carry no mass.
    pub fn compute_delta_mass(&self) -> Result<Mass, segment::Error> {
        let mut total = Mass::new::<kilogram>(0.0);
        for solution in &self.segment_solutions {
            total = total + solution.compute_delta_mass()?;
        }
        Ok(total)
    }

    /// Sum of the segments' rocket-equation velocity changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the states carry no mass.
    pub fn compute_delta_v(&self, specific_impulse: Time) -> Result<Velocity, segment::Error> {
        let mut total = Velocity::new::<meter_per_second>(0.0);
        for solution in &self.segment_solutions {
            total = total + solution.compute_delta_v(specific_impulse)?;
        }
        Ok(total)
    }
}
