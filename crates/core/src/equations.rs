use std::error::Error as StdError;

use nalgebra::DVector;

use crate::Instant;

/// The right-hand side of a first-order ODE over a flat coordinate vector.
///
/// Implementations must be pure: the same `(instant, coordinates)` pair always
/// yields the same derivative. Integrators may call [`derivative`] many times
/// per step and at instants they later discard.
///
/// [`derivative`]: Equations::derivative
pub trait Equations {
    type Error: StdError + Send + Sync + 'static;

    /// Computes the time derivative of `coordinates` at `instant`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn derivative(
        &self,
        instant: Instant,
        coordinates: &DVector<f64>,
    ) -> Result<DVector<f64>, Self::Error>;
}

impl<E: Equations + ?Sized> Equations for &E {
    type Error = E::Error;

    fn derivative(
        &self,
        instant: Instant,
        coordinates: &DVector<f64>,
    ) -> Result<DVector<f64>, Self::Error> {
        (**self).derivative(instant, coordinates)
    }
}
