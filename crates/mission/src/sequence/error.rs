use thiserror::Error;
use tether_core::condition;

use crate::segment;

use super::Solution;

/// Errors that can occur when building or solving a sequence.
///
/// Errors raised while flying carry the partial [`Solution`] up to the
/// failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sequence has no segments")]
    NoSegments,

    #[error("repetition count must be at least one")]
    InvalidRepetitionCount,

    #[error("duration {seconds} s must be finite and positive")]
    InvalidDuration { seconds: f64 },

    #[error("invalid segment")]
    InvalidSegment(#[from] segment::Error),

    #[error("outer condition failed")]
    Condition(#[source] condition::Error),

    #[error("segment {index} (`{segment}`) failed")]
    SegmentFailed {
        index: usize,
        segment: String,
        partial: Box<Solution>,
        #[source]
        source: segment::Error,
    },

    #[error("outer condition not reached within {seconds} s")]
    DurationExhausted { seconds: f64, partial: Box<Solution> },

    #[error("a pass through the segments made no progress in time")]
    NoProgress { partial: Box<Solution> },
}

impl Error {
    /// The solution flown before the failure, if any.
    #[must_use]
    pub fn partial(&self) -> Option<&Solution> {
        match self {
            Self::SegmentFailed { partial, .. }
            | Self::DurationExhausted { partial, .. }
            | Self::NoProgress { partial } => Some(partial),
            _ => None,
        }
    }
}
