//! Shared fixtures for the cross-crate mission scenarios.

use std::sync::Arc;

use nalgebra::DVector;
use tether_core::{
    CoordinateSubset, Dynamics, Frame, Instant, State, StateBuilder,
    dynamics::{CentralBodyGravity, ContributionError, PositionDerivative},
};
use tracing_subscriber::EnvFilter;
use uom::si::{f64::Time, time::second};

/// Radius of the circular reference orbit, in meters.
pub const ORBIT_RADIUS: f64 = 7_000_000.0;

/// Installs a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[must_use]
pub fn seconds(value: f64) -> Time {
    Time::new::<second>(value)
}

/// Speed of a circular orbit at [`ORBIT_RADIUS`] around Earth.
#[must_use]
pub fn circular_speed() -> f64 {
    (CentralBodyGravity::EARTH_GRAVITATIONAL_PARAMETER / ORBIT_RADIUS).sqrt()
}

/// Period of the circular reference orbit, in seconds.
#[must_use]
pub fn orbital_period() -> f64 {
    std::f64::consts::TAU * ORBIT_RADIUS / circular_speed()
}

/// A spacecraft of `mass` kg on an equatorial circular orbit at J2000.
///
/// # Panics
///
/// Never for the built-in subsets.
#[must_use]
pub fn spacecraft(mass: f64) -> State {
    StateBuilder::new(
        Frame::gcrf(),
        [
            CoordinateSubset::cartesian_position(),
            CoordinateSubset::cartesian_velocity(),
            CoordinateSubset::mass(),
        ],
    )
    .expect("built-in subsets are distinct")
    .build(
        Instant::j2000(),
        DVector::from_vec(vec![
            ORBIT_RADIUS,
            0.0,
            0.0,
            0.0,
            circular_speed(),
            0.0,
            mass,
        ]),
    )
    .expect("coordinates match the layout")
}

/// Kinematics plus Earth point-mass gravity.
#[must_use]
pub fn two_body() -> Vec<Arc<dyn Dynamics>> {
    vec![
        Arc::new(PositionDerivative),
        Arc::new(CentralBodyGravity::earth()),
    ]
}

/// Writes a zero velocity derivative, leaving the state untouched when used
/// alone.
#[derive(Debug)]
pub struct Inert;

impl Dynamics for Inert {
    fn name(&self) -> &str {
        "inert"
    }

    fn read_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        Vec::new()
    }

    fn write_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_velocity()]
    }

    fn compute_contribution(
        &self,
        _instant: Instant,
        _read: &DVector<f64>,
        _frame: &Frame,
    ) -> Result<DVector<f64>, ContributionError> {
        Ok(DVector::zeros(3))
    }
}
