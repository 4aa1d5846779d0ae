use nalgebra::DVector;

use super::Sample;

/// Cubic Hermite interpolation across an accepted step.
///
/// Uses the states and derivatives at both ends, so it costs no extra
/// evaluation of the equations. `theta` runs from `0` at `start` to `1` at
/// `end`, and the ends are reproduced exactly.
pub(super) fn hermite(start: &Sample, end: &Sample, theta: f64) -> DVector<f64> {
    if theta <= 0.0 {
        return start.x.clone();
    }
    if theta >= 1.0 {
        return end.x.clone();
    }

    let h = end.t - start.t;
    let theta2 = theta * theta;
    let theta3 = theta2 * theta;

    let h00 = 2.0 * theta3 - 3.0 * theta2 + 1.0;
    let h10 = theta3 - 2.0 * theta2 + theta;
    let h01 = -2.0 * theta3 + 3.0 * theta2;
    let h11 = theta3 - theta2;

    &start.x * h00 + &start.dx * (h10 * h) + &end.x * h01 + &end.dx * (h11 * h)
}

/// The time at `theta` across a step, matching the ends exactly.
pub(super) fn time_at(start: &Sample, end: &Sample, theta: f64) -> f64 {
    if theta <= 0.0 {
        start.t
    } else if theta >= 1.0 {
        end.t
    } else {
        start.t + theta * (end.t - start.t)
    }
}
