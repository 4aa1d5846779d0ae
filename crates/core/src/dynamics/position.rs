use std::sync::Arc;

use nalgebra::DVector;

use crate::{CoordinateSubset, Frame, Instant};

use super::{ContributionError, Dynamics};

/// Kinematics: the position derivative is the velocity.
#[derive(Debug, Clone, Default)]
pub struct PositionDerivative;

impl PositionDerivative {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Dynamics for PositionDerivative {
    fn name(&self) -> &str {
        "position derivative"
    }

    fn read_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_velocity()]
    }

    fn write_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
        vec![CoordinateSubset::cartesian_position()]
    }

    fn compute_contribution(
        &self,
        _instant: Instant,
        read: &DVector<f64>,
        _frame: &Frame,
    ) -> Result<DVector<f64>, ContributionError> {
        Ok(read.clone())
    }
}
