use thiserror::Error;
use tether_core::{Instant, condition, dynamics, state};
use tether_solvers::numerical;

/// Errors that can occur when building or solving a segment.
#[derive(Debug, Error)]
pub enum Error {
    #[error("segment name must not be empty")]
    EmptyName,

    #[error("segment `{segment}` has no dynamics")]
    NoDynamics { segment: String },

    #[error("segment `{segment}`: duration {seconds} s must be finite and positive")]
    InvalidDuration { segment: String, seconds: f64 },

    #[error(
        "segment `{segment}` did not reach condition `{condition}` within {seconds} s"
    )]
    ConditionNotSatisfied {
        segment: String,
        condition: String,
        seconds: f64,
    },

    #[error("instant {instant} is outside the segment span [{start}, {end}]")]
    InstantOutOfSpan {
        instant: Instant,
        start: Instant,
        end: Instant,
    },

    #[error("event condition failed")]
    Condition(#[from] condition::Error),

    #[error("dynamics do not fit the state layout")]
    Dynamics(#[from] dynamics::Error),

    #[error("propagation failed")]
    Propagation(#[from] numerical::Error),

    #[error(transparent)]
    State(#[from] state::Error),
}
