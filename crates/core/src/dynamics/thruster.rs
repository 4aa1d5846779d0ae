use std::sync::Arc;

use nalgebra::{DVector, Unit, Vector3};
use thiserror::Error;
use uom::si::{
    f64::{Force, Mass, Time},
    force::newton,
    mass::kilogram,
    time::second,
};

use crate::{CoordinateSubset, Frame, Instant};

use super::{ContributionError, Dynamics, Error};

/// Standard gravity, m/s², used to convert specific impulse to exhaust speed.
pub const STANDARD_GRAVITY: f64 = 9.806_65;

/// Raised by a [`Thruster`] while it is firing.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ThrusterError {
    #[error("propellant exhausted: mass {mass} kg is at or below dry mass {dry_mass} kg")]
    PropellantExhausted { mass: f64, dry_mass: f64 },

    #[error("thrust along velocity is undefined at zero velocity")]
    UndefinedDirection,
}

/// Where a thruster points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrustDirection {
    /// A constant unit vector in the integration frame.
    Fixed(Unit<Vector3<f64>>),

    /// Along the instantaneous velocity.
    AlongVelocity,
}

impl ThrustDirection {
    /// A fixed direction, normalized from `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `direction` is zero or not
    /// finite.
    pub fn fixed(direction: Vector3<f64>) -> Result<Self, Error> {
        if !direction.iter().all(|component| component.is_finite()) {
            return Err(invalid("direction", "must be finite"));
        }
        Unit::try_new(direction, f64::EPSILON)
            .map(Self::Fixed)
            .ok_or_else(|| invalid("direction", "must be non-zero"))
    }
}

/// A constant-thrust engine consuming propellant at a fixed rate.
///
/// Reads velocity and mass; writes the thrust acceleration into the velocity
/// derivative and the mass flow into the mass derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct Thruster {
    thrust: f64,
    specific_impulse: f64,
    dry_mass: f64,
    direction: ThrustDirection,
}

impl Thruster {
    /// Creates a thruster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless thrust and specific impulse
    /// are finite and positive and the dry mass is finite and non-negative.
    pub fn new(
        thrust: Force,
        specific_impulse: Time,
        dry_mass: Mass,
        direction: ThrustDirection,
    ) -> Result<Self, Error> {
        let thrust = thrust.get::<newton>();
        let specific_impulse = specific_impulse.get::<second>();
        let dry_mass = dry_mass.get::<kilogram>();

        if !thrust.is_finite() || thrust <= 0.0 {
            return Err(invalid("thrust", "must be finite and positive"));
        }
        if !specific_impulse.is_finite() || specific_impulse <= 0.0 {
            return Err(invalid("specific_impulse", "must be finite and positive"));
        }
        if !dry_mass.is_finite() || dry_mass < 0.0 {
            return Err(invalid("dry_mass", "must be finite and non-negative"));
        }

        Ok(Self {
            thrust,
            specific_impulse,
            dry_mass,
            direction,
        })
    }

    #[must_use]
    pub fn thrust(&self) -> Force {
        Force::new::<newton>(self.thrust)
    }

    #[must_use]
    pub fn specific_impulse(&self) -> Time {
        Time::new::<second>(self.specific_impulse)
    }

    #[must_use]
    pub fn dry_mass(&self) -> Mass {
        Mass::new::<kilogram>(self.dry_mass)
    }

    #[must_use]
    pub fn direction(&self) -> ThrustDirection {
        self.direction
    }

    /// Propellant consumption in kg/s, as a positive number.
    #[must_use]
    pub fn mass_flow_rate(&self) -> f64 {
        self.thrust / (self.specific_impulse * STANDARD_GRAVITY)
    }
}

impl Dynamics for Thruster {
    fn name(&self) -> &str {
        "thruster"
    }

    fn read_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_velocity(), CoordinateSubset::mass()]
    }

    fn write_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_velocity(), CoordinateSubset::mass()]
    }

    fn compute_contribution(
        &self,
        _instant: Instant,
        read: &DVector<f64>,
        _frame: &Frame,
    ) -> Result<DVector<f64>, ContributionError> {
        let velocity = Vector3::new(read[0], read[1], read[2]);
        let mass = read[3];

        if mass <= self.dry_mass {
            return Err(Box::new(ThrusterError::PropellantExhausted {
                mass,
                dry_mass: self.dry_mass,
            }));
        }

        let direction = match self.direction {
            ThrustDirection::Fixed(direction) => direction,
            ThrustDirection::AlongVelocity => Unit::try_new(velocity, f64::EPSILON)
                .ok_or(ThrusterError::UndefinedDirection)?,
        };

        let acceleration = direction.into_inner() * (self.thrust / mass);
        Ok(DVector::from_vec(vec![
            acceleration.x,
            acceleration.y,
            acceleration.z,
            -self.mass_flow_rate(),
        ]))
    }
}

fn invalid(parameter: &'static str, reason: &'static str) -> Error {
    Error::InvalidParameter {
        dynamics: "thruster",
        parameter,
        reason,
    }
}
