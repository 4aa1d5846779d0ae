use thiserror::Error;

use crate::{Instant, coordinate};

/// Errors raised when building, converting or combining states.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Coordinate(#[from] coordinate::Error),

    #[error("coordinates have width {found}, broker expects {expected}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("states use different coordinate layouts")]
    BrokerMismatch,

    #[error("states are at different instants: {left} and {right}")]
    InstantMismatch { left: Instant, right: Instant },

    #[error("states are in different frames: {left} and {right}")]
    FrameMismatch { left: String, right: String },

    #[error("coordinate subset `{name}` is in neither the state nor the default state")]
    UnresolvedSubset { name: String },
}
