use std::error::Error as StdError;

use thiserror::Error;

use super::{BracketError, ConfigError};

/// Errors that can occur during a root search.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bracket: {0}")]
    InvalidBracket(#[from] BracketError),

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("initial guess {guess} or step {step} is not finite and positive")]
    InvalidGuess { guess: f64, step: f64 },

    #[error("function is not finite at x = {x}")]
    NonFiniteValue { x: f64 },

    #[error("no sign change found within {iters} expansions from {guess}")]
    NoBracket { guess: f64, iters: usize },

    #[error("function error")]
    Function(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn function<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Function(Box::new(err))
    }
}
