use std::error::Error as StdError;

use thiserror::Error;

use crate::state;

/// Errors raised while evaluating event conditions.
#[derive(Debug, Error)]
pub enum Error {
    #[error("condition `{condition}` has a relative target that was never resolved")]
    UnresolvedTarget { condition: String },

    #[error("condition `{condition}` does not evaluate to a scalar")]
    NotScalar { condition: String },

    #[error("condition `{condition}` reads index {index} of `{subset}`, which has size {size}")]
    IndexOutOfRange {
        condition: String,
        subset: String,
        index: usize,
        size: usize,
    },

    #[error("range [{lower}, {upper}] is empty or not finite")]
    InvalidRange { lower: f64, upper: f64 },

    #[error(transparent)]
    State(#[from] state::Error),

    #[error("condition evaluator failed")]
    Evaluator(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// Wraps an error raised by a user-supplied evaluator.
    pub fn evaluator<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Evaluator(Box::new(err))
    }
}
