//! Ordered chains of segments.
//!
//! A [`Sequence`] flies its segments in order, each starting from the final
//! state of the one before. [`Sequence::solve`] repeats the list a fixed
//! number of times. [`Sequence::solve_to_condition`] repeats it until an
//! outer condition holds between the start and the end of a pass.
//!
//! Every segment is limited to the sequence's segment duration limit. A
//! failing segment stops the sequence; the error carries what was flown.

mod error;
mod solution;

use std::sync::Arc;

use tether_core::{Condition, Dynamics, EventCondition, State, dynamics::Thruster};
use tether_solvers::NumericalSolver;
use tracing::debug;
use uom::si::{f64::Time, time::second};

pub use error::Error;
pub use solution::Solution;

use crate::segment::{self, Segment};

#[derive(Debug, Clone)]
pub struct Sequence {
    segments: Vec<Segment>,
    solver: NumericalSolver,
    dynamics: Vec<Arc<dyn Dynamics>>,
    segment_duration_limit: Time,
}

impl Sequence {
    /// Creates a sequence.
    ///
    /// `solver` and `dynamics` are used by segments added later through
    /// [`Sequence::add_coast_segment`] and [`Sequence::add_maneuver_segment`].
    ///
    /// # Errors
    ///
    /// Returns an error if the duration limit is not finite and positive.
    pub fn new(
        segments: Vec<Segment>,
        solver: NumericalSolver,
        dynamics: Vec<Arc<dyn Dynamics>>,
        segment_duration_limit: Time,
    ) -> Result<Self, Error> {
        check_duration(segment_duration_limit)?;
        Ok(Self {
            segments,
            solver,
            dynamics,
            segment_duration_limit,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn solver(&self) -> &NumericalSolver {
        &self.solver
    }

    #[must_use]
    pub fn dynamics(&self) -> &[Arc<dyn Dynamics>] {
        &self.dynamics
    }

    #[must_use]
    pub fn segment_duration_limit(&self) -> Time {
        self.segment_duration_limit
    }

    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Appends a coast with the sequence's solver and dynamics.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is invalid.
    pub fn add_coast_segment(
        &mut self,
        name: impl Into<String>,
        condition: impl Into<Condition>,
    ) -> Result<(), Error> {
        let segment = Segment::coast(name, condition, self.dynamics.clone(), self.solver.clone())?;
        self.segments.push(segment);
        Ok(())
    }

    /// Appends a maneuver with the sequence's solver and dynamics.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is invalid.
    pub fn add_maneuver_segment(
        &mut self,
        name: impl Into<String>,
        condition: impl Into<Condition>,
        thruster: Thruster,
    ) -> Result<(), Error> {
        let segment = Segment::maneuver(
            name,
            condition,
            thruster,
            self.dynamics.clone(),
            self.solver.clone(),
        )?;
        self.segments.push(segment);
        Ok(())
    }

    /// Flies the segment list `repetition_count` times.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no segments or the count is zero, or
    /// [`Error::SegmentFailed`] with the partial solution if a segment fails.
    pub fn solve(&self, initial_state: &State, repetition_count: usize) -> Result<Solution, Error> {
        if self.segments.is_empty() {
            return Err(Error::NoSegments);
        }
        if repetition_count == 0 {
            return Err(Error::InvalidRepetitionCount);
        }

        let mut solution = Solution::default();
        let mut current = initial_state.clone();

        for repetition in 0..repetition_count {
            debug!(repetition, start = %current.instant(), "solving sequence pass");
            current = self.fly_pass(&current, &mut solution, |_| self.segment_duration_limit)?;
        }

        solution.execution_is_complete = true;
        Ok(solution)
    }

    /// Flies the segment list until `condition` holds.
    ///
    /// After every full pass, the condition is checked with the pass's final
    /// state as the current sample and its initial state as the previous one.
    /// Its relative targets are resolved once, against `initial_state`. Each
    /// segment is limited to whichever is shorter of the segment duration
    /// limit and the time left of `maximum_duration`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DurationExhausted`] if `maximum_duration` runs out
    /// first, [`Error::NoProgress`] if a pass does not advance in time, or
    /// [`Error::SegmentFailed`] if a segment fails.
    pub fn solve_to_condition(
        &self,
        initial_state: &State,
        condition: impl Into<Condition>,
        maximum_duration: Time,
    ) -> Result<Solution, Error> {
        if self.segments.is_empty() {
            return Err(Error::NoSegments);
        }
        check_duration(maximum_duration)?;

        let mut condition = condition.into();
        condition
            .update_target(initial_state)
            .map_err(Error::Condition)?;

        let limit = self.segment_duration_limit.get::<second>();
        let end = initial_state.instant() + maximum_duration;
        let mut solution = Solution::default();
        let mut current = initial_state.clone();

        for pass in 0_usize.. {
            debug!(pass, start = %current.instant(), "solving sequence pass");
            let pass_start = current.clone();

            let flown = self.fly_pass(&pass_start, &mut solution, |state| {
                let remaining = end.seconds_since(state.instant());
                Time::new::<second>(limit.min(remaining))
            });
            current = match flown {
                Ok(state) => state,
                Err(Error::SegmentFailed {
                    partial, source, ..
                }) if cut_short(&source, limit) => {
                    return Err(Error::DurationExhausted {
                        seconds: maximum_duration.get::<second>(),
                        partial,
                    });
                }
                Err(error) => return Err(error),
            };

            let reached = condition
                .is_satisfied(&current, &pass_start)
                .map_err(Error::Condition)?;
            if reached {
                debug!(pass, end = %current.instant(), "outer condition reached");
                solution.execution_is_complete = true;
                return Ok(solution);
            }
            if current.instant() <= pass_start.instant() {
                break;
            }
        }

        Err(Error::NoProgress {
            partial: Box::new(solution),
        })
    }

    /// Flies each segment once from `start`, appending to `solution`.
    ///
    /// Returns the final state of the pass.
    fn fly_pass<L>(
        &self,
        start: &State,
        solution: &mut Solution,
        limit: L,
    ) -> Result<State, Error>
    where
        L: Fn(&State) -> Time,
    {
        let mut current = start.clone();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment.solve(&current, limit(&current)) {
                Ok(flown) => {
                    current = flown.final_state().clone();
                    solution.segment_solutions.push(flown);
                }
                Err(source) => {
                    return Err(Error::SegmentFailed {
                        index,
                        segment: segment.name().to_owned(),
                        partial: Box::new(std::mem::take(solution)),
                        source,
                    });
                }
            }
        }

        Ok(current)
    }
}

/// Whether a segment failed because the time left was shorter than the
/// segment duration limit.
fn cut_short(source: &segment::Error, limit: f64) -> bool {
    match source {
        segment::Error::ConditionNotSatisfied { seconds, .. }
        | segment::Error::InvalidDuration { seconds, .. } => *seconds < limit,
        _ => false,
    }
}

fn check_duration(duration: Time) -> Result<(), Error> {
    let seconds = duration.get::<second>();
    if seconds.is_finite() && seconds > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDuration { seconds })
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
        dynamics::PositionDerivative,
    };

    fn seconds(value: f64) -> Time {
        Time::new::<second>(value)
    }

    fn drifting_state() -> State {
        StateBuilder::new(
            Frame::gcrf(),
            [
                CoordinateSubset::cartesian_position(),
                CoordinateSubset::cartesian_velocity(),
            ],
        )
        .expect("valid layout")
        .build(
            Instant::j2000(),
            DVector::from_vec(vec![0.0, 0.0, 0.0, 1.0, 2.0, 0.0]),
        )
        .expect("valid width")
    }

    fn every(duration: f64) -> RealCondition {
        RealCondition::duration(Criterion::AnyCrossing, seconds(duration))
    }

    fn sequence(limit: f64) -> Sequence {
        let mut sequence = Sequence::new(
            Vec::new(),
            NumericalSolver::default(),
            vec![Arc::new(PositionDerivative)],
            seconds(limit),
        )
        .expect("valid limit");
        sequence
            .add_coast_segment("ten seconds", every(10.0))
            .expect("valid segment");
        sequence
    }

    #[test]
    fn repetitions_chain_segments() {
        let solution = sequence(100.0)
            .solve(&drifting_state(), 3)
            .expect("every segment reaches its condition");

        assert!(solution.execution_is_complete);
        assert_eq!(solution.segment_solutions.len(), 3);
        for pair in solution.segment_solutions.windows(2) {
            assert_eq!(pair[1].initial_state(), pair[0].final_state());
        }
        assert_relative_eq!(solution.propagation_duration().get::<second>(), 30.0, epsilon = 1e-8);

        let states = solution.states();
        assert_eq!(states.first(), Some(&drifting_state()));
        assert!(states.windows(2).all(|pair| pair[0].instant() < pair[1].instant()));
        assert_eq!(
            solution.end_instant(),
            Some(solution.segment_solutions[2].end_instant())
        );
    }

    #[test]
    fn repeats_until_the_outer_condition() {
        let solution = sequence(100.0)
            .solve_to_condition(&drifting_state(), every(35.0), seconds(1000.0))
            .expect("outer condition reachable");

        assert!(solution.execution_is_complete);
        assert_eq!(solution.segment_solutions.len(), 4);
        assert_relative_eq!(solution.propagation_duration().get::<second>(), 40.0, epsilon = 1e-8);
    }

    #[test]
    fn running_out_of_time_keeps_the_partial_solution() {
        let result =
            sequence(100.0).solve_to_condition(&drifting_state(), every(35.0), seconds(25.0));

        let Err(error) = result else {
            panic!("expected the duration to run out");
        };
        assert!(matches!(error, Error::DurationExhausted { .. }));
        let partial = error.partial().expect("partial solution");
        assert!(!partial.execution_is_complete);
        assert_eq!(partial.segment_solutions.len(), 2);
    }

    #[test]
    fn failing_segment_reports_its_index() {
        let mut sequence = sequence(15.0);
        sequence
            .add_coast_segment("too long", every(60.0))
            .expect("valid segment");

        let result = sequence.solve(&drifting_state(), 2);

        let Err(Error::SegmentFailed {
            index,
            segment: name,
            partial,
            source,
        }) = result
        else {
            panic!("expected the second segment to fail");
        };
        assert_eq!(index, 1);
        assert_eq!(name, "too long");
        assert_eq!(partial.segment_solutions.len(), 1);
        assert!(matches!(source, segment::Error::ConditionNotSatisfied { .. }));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let empty = Sequence::new(
            Vec::new(),
            NumericalSolver::default(),
            Vec::new(),
            seconds(10.0),
        )
        .expect("valid limit");

        assert!(matches!(
            empty.solve(&drifting_state(), 1),
            Err(Error::NoSegments)
        ));
        assert!(matches!(
            sequence(10.0).solve(&drifting_state(), 0),
            Err(Error::InvalidRepetitionCount)
        ));
        assert!(matches!(
            Sequence::new(Vec::new(), NumericalSolver::default(), Vec::new(), seconds(0.0)),
            Err(Error::InvalidDuration { .. })
        ));
        assert!(matches!(
            empty.clone().add_coast_segment("no dynamics", every(1.0)),
            Err(Error::InvalidSegment(segment::Error::NoDynamics { .. }))
        ));
    }
}
