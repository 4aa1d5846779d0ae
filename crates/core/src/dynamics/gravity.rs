use std::sync::Arc;

use nalgebra::{DVector, Vector3};
use thiserror::Error;

use crate::{CoordinateSubset, Frame, Instant};

use super::{ContributionError, Dynamics, Error};

/// Raised when gravity is evaluated at the central body's center.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("position is at the center of the central body")]
pub struct GravityError;

/// Point-mass gravity of a central body at the frame origin.
///
/// The gravitational parameter is in m³/s².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralBodyGravity {
    gravitational_parameter: f64,
}

impl CentralBodyGravity {
    /// Earth's gravitational parameter (EGM2008), m³/s².
    pub const EARTH_GRAVITATIONAL_PARAMETER: f64 = 3.986_004_418e14;

    /// Creates point-mass gravity with a gravitational parameter in m³/s².
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless the parameter is finite and
    /// positive.
    pub fn new(gravitational_parameter: f64) -> Result<Self, Error> {
        if !gravitational_parameter.is_finite() || gravitational_parameter <= 0.0 {
            return Err(Error::InvalidParameter {
                dynamics: "central body gravity",
                parameter: "gravitational_parameter",
                reason: "must be finite and positive",
            });
        }
        Ok(Self {
            gravitational_parameter,
        })
    }

    #[must_use]
    pub const fn earth() -> Self {
        Self {
            gravitational_parameter: Self::EARTH_GRAVITATIONAL_PARAMETER,
        }
    }

    #[must_use]
    pub fn gravitational_parameter(&self) -> f64 {
        self.gravitational_parameter
    }
}

impl Dynamics for CentralBodyGravity {
    fn name(&self) -> &str {
        "central body gravity"
    }

    fn read_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_position()]
    }

    fn write_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_velocity()]
    }

    fn compute_contribution(
        &self,
        _instant: Instant,
        read: &DVector<f64>,
        _frame: &Frame,
    ) -> Result<DVector<f64>, ContributionError> {
        let position = Vector3::new(read[0], read[1], read[2]);
        let radius = position.norm();
        if radius == 0.0 {
            return Err(Box::new(GravityError));
        }

        let acceleration = position * (-self.gravitational_parameter / radius.powi(3));
        Ok(DVector::from_column_slice(acceleration.as_slice()))
    }
}
