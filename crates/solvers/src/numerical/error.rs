use std::error::Error as StdError;

use thiserror::Error;
use tether_core::{Instant, condition, state};

use crate::root;

use super::ConfigError;

/// Errors that can occur during numerical integration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("equations failed")]
    Equations(#[source] Box<dyn StdError + Send + Sync>),

    #[error("event condition failed")]
    Condition(#[from] condition::Error),

    #[error(transparent)]
    State(#[from] state::Error),

    #[error("locating the event failed")]
    RootSolver(#[from] root::Error),

    #[error("target instant {instant} is not finite")]
    NonFiniteInstant { instant: Instant },

    #[error("derivative has width {found}, state has width {expected}")]
    DerivativeWidth { expected: usize, found: usize },

    #[error("step size {step} s underflowed at {instant}")]
    StepSizeUnderflow { instant: Instant, step: f64 },

    #[error("state is not finite at {instant}")]
    NonFiniteState { instant: Instant },
}

impl Error {
    pub(crate) fn equations<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Equations(Box::new(err))
    }
}
