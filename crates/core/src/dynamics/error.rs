use thiserror::Error;

use super::ContributionError;

/// Errors raised while assembling or evaluating dynamics.
#[derive(Debug, Error)]
pub enum Error {
    #[error("dynamics `{dynamics}` reads `{subset}`, which is not part of the state layout")]
    MissingReadSubset { dynamics: String, subset: String },

    #[error("dynamics `{dynamics}` writes `{subset}`, which is not part of the state layout")]
    MissingWriteSubset { dynamics: String, subset: String },

    #[error("dynamics `{dynamics}` returned {found} values, its write subsets span {expected}")]
    ContributionSize {
        dynamics: String,
        expected: usize,
        found: usize,
    },

    #[error("coordinates have width {found}, the dynamics layout expects {expected}")]
    StateWidth { expected: usize, found: usize },

    #[error("dynamics `{dynamics}` parameter `{parameter}` is invalid: {reason}")]
    InvalidParameter {
        dynamics: &'static str,
        parameter: &'static str,
        reason: &'static str,
    },

    #[error("dynamics `{dynamics}` failed")]
    Contribution {
        dynamics: String,
        #[source]
        source: ContributionError,
    },
}
