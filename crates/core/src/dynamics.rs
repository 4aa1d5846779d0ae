//! Composable contributions to the state derivative.
//!
//! A [`Dynamics`] declares which coordinate subsets it reads and which it
//! writes, and computes its share of the derivative from the packed read
//! coordinates. An [`Aggregator`] binds a list of dynamics to one state layout
//! and sums their contributions into a single derivative vector, so several
//! dynamics may write the same subset (two gravity sources both add to the
//! velocity derivative).
//!
//! The aggregator implements [`Equations`](crate::Equations) and is what an
//! integrator consumes.

mod aggregator;
mod context;
mod error;
mod gravity;
mod position;
mod thruster;

use std::{error::Error as StdError, fmt, sync::Arc};

use nalgebra::DVector;

use crate::{CoordinateSubset, Frame, Instant};

pub use aggregator::Aggregator;
pub use context::Context;
pub use error::Error;
pub use gravity::{CentralBodyGravity, GravityError};
pub use position::PositionDerivative;
pub use thruster::{STANDARD_GRAVITY, ThrustDirection, Thruster, ThrusterError};

/// An error raised by a dynamics while computing its contribution.
pub type ContributionError = Box<dyn StdError + Send + Sync>;

/// A contribution to the time derivative of a state.
///
/// Implementations are shared read-only between propagations, so they must
/// not carry run-specific mutable state.
pub trait Dynamics: fmt::Debug + Send + Sync {
    /// A short name used in logs and errors.
    fn name(&self) -> &str;

    /// Subsets whose coordinates are packed, in this order, into the `read`
    /// argument of [`compute_contribution`](Self::compute_contribution).
    fn read_subsets(&self) -> Vec<Arc<CoordinateSubset>>;

    /// Subsets whose derivatives the contribution holds, in this order.
    fn write_subsets(&self) -> Vec<Arc<CoordinateSubset>>;

    /// Computes this contribution to the derivative.
    ///
    /// The result must be as wide as the write subsets combined.
    ///
    /// # Errors
    ///
    /// Returns an error if the contribution is undefined for these
    /// coordinates. The error aborts the propagation.
    fn compute_contribution(
        &self,
        instant: Instant,
        read: &DVector<f64>,
        frame: &Frame,
    ) -> Result<DVector<f64>, ContributionError>;
}
