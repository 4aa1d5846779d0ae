use std::f64::consts::{PI, TAU};

/// How a scalar is compared against its target.
///
/// Crossing criteria look at two consecutive samples. The others look at the
/// current sample only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    /// The value rose through the target: `previous < target <= current`.
    PositiveCrossing,

    /// The value fell through the target: `previous > target >= current`.
    NegativeCrossing,

    /// Either crossing.
    AnyCrossing,

    /// The value is above the target.
    StrictlyPositive,

    /// The value is below the target.
    StrictlyNegative,

    /// The value lies in `[lower, upper]`. The target is ignored.
    WithinRange { lower: f64, upper: f64 },
}

impl Criterion {
    /// Applies the criterion to real values.
    #[must_use]
    pub fn is_satisfied(&self, current: f64, previous: f64, target: f64) -> bool {
        let current_delta = current - target;
        let previous_delta = previous - target;

        match *self {
            Self::PositiveCrossing => rises(current_delta, previous_delta),
            Self::NegativeCrossing => falls(current_delta, previous_delta),
            Self::AnyCrossing => {
                rises(current_delta, previous_delta) || falls(current_delta, previous_delta)
            }
            Self::StrictlyPositive => current_delta > 0.0,
            Self::StrictlyNegative => current_delta < 0.0,
            Self::WithinRange { lower, upper } => lower <= current && current <= upper,
        }
    }

    /// Applies the criterion to angles, in radians.
    ///
    /// Differences to the target are wrapped into `(-π, π]`, so a crossing is
    /// detected across the wrap-around of the angle, while the jump between
    /// `π` and `-π` on the far side of the target is not a crossing.
    #[must_use]
    pub fn is_satisfied_angular(&self, current: f64, previous: f64, target: f64) -> bool {
        let current_delta = wrap(current - target);
        let previous_delta = wrap(previous - target);
        let continuous = (current_delta - previous_delta).abs() < PI;

        match *self {
            Self::PositiveCrossing => continuous && rises(current_delta, previous_delta),
            Self::NegativeCrossing => continuous && falls(current_delta, previous_delta),
            Self::AnyCrossing => {
                continuous
                    && (rises(current_delta, previous_delta)
                        || falls(current_delta, previous_delta))
            }
            Self::StrictlyPositive => current_delta > 0.0,
            Self::StrictlyNegative => current_delta < 0.0,
            Self::WithinRange { lower, upper } => {
                let unwrapped = lower + (current - lower).rem_euclid(TAU);
                unwrapped <= upper
            }
        }
    }
}

fn rises(current: f64, previous: f64) -> bool {
    previous < 0.0 && current >= 0.0
}

fn falls(current: f64, previous: f64) -> bool {
    previous > 0.0 && current <= 0.0
}

/// Wraps an angle into `(-π, π]`.
fn wrap(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}
