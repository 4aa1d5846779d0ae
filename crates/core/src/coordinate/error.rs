use thiserror::Error;

/// Errors raised by coordinate subsets and brokers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("coordinate subset must have a name")]
    UnnamedSubset,

    #[error("coordinate subset `{name}` must have a size greater than zero")]
    EmptySubset { name: String },

    #[error("coordinate subset `{name}` is already registered")]
    DuplicateSubset { name: String },

    #[error("coordinate subset `{name}` is not registered")]
    MissingSubset { name: String },

    #[error("vector width {found} does not match broker width {expected}")]
    WidthMismatch { expected: usize, found: usize },
}
