use thiserror::Error;

/// Errors that make a bracket unusable.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum BracketError {
    #[error("bracket bounds must be finite")]
    NonFinite,

    #[error("bracket bounds must differ")]
    ZeroWidth,

    #[error("function has the same sign at {lower} and {upper}")]
    NoSignChange { lower: f64, upper: f64 },
}

/// The sign of a function value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub(super) fn of(value: f64) -> Self {
        if value > 0.0 {
            Self::Positive
        } else if value < 0.0 {
            Self::Negative
        } else {
            Self::Zero
        }
    }
}

/// Whether the function changes sign (or vanishes) between two values.
pub(super) fn straddles(a: f64, b: f64) -> bool {
    !matches!(
        (Sign::of(a), Sign::of(b)),
        (Sign::Positive, Sign::Positive) | (Sign::Negative, Sign::Negative)
    )
}

/// Checks bounds before any evaluation.
pub(super) fn check_bounds(lower: f64, upper: f64) -> Result<(), BracketError> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(BracketError::NonFinite);
    }
    if lower == upper {
        return Err(BracketError::ZeroWidth);
    }
    Ok(())
}

/// Orders two bounds.
pub(super) fn sorted(a: f64, b: f64) -> [f64; 2] {
    if a <= b { [a, b] } else { [b, a] }
}
