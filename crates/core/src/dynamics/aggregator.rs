use std::sync::Arc;

use nalgebra::DVector;
use tracing::debug;

use crate::{CoordinateBroker, Equations, Frame, Instant, State};

use super::{Context, Dynamics, Error};

/// Sums the contributions of several dynamics over one state layout.
#[derive(Debug, Clone)]
pub struct Aggregator {
    contexts: Vec<Context>,
    frame: Frame,
    width: usize,
}

impl Aggregator {
    /// Binds `dynamics` to the layout of `broker`, integrating in `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if any dynamics reads or writes a subset that the
    /// broker does not lay out.
    pub fn new(
        dynamics: &[Arc<dyn Dynamics>],
        broker: &CoordinateBroker,
        frame: Frame,
    ) -> Result<Self, Error> {
        let contexts = dynamics
            .iter()
            .map(|dynamics| Context::new(Arc::clone(dynamics), broker))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            contexts = contexts.len(),
            width = broker.width(),
            frame = %frame,
            "bound dynamics to state layout"
        );

        Ok(Self {
            contexts,
            frame,
            width: broker.width(),
        })
    }

    /// Binds `dynamics` to the layout and frame of `state`.
    ///
    /// # Errors
    ///
    /// See [`Aggregator::new`].
    pub fn for_state(dynamics: &[Arc<dyn Dynamics>], state: &State) -> Result<Self, Error> {
        Self::new(dynamics, state.broker(), state.frame().clone())
    }

    #[must_use]
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Width of the state and derivative vectors.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Computes the full derivative at `instant`.
    ///
    /// Subsets no dynamics writes have a zero derivative.
    ///
    /// # Errors
    ///
    /// Returns an error if `coordinates` has the wrong width, or if a dynamics
    /// fails or returns a contribution of the wrong width.
    pub fn compute(&self, instant: Instant, coordinates: &DVector<f64>) -> Result<DVector<f64>, Error> {
        if coordinates.len() != self.width {
            return Err(Error::StateWidth {
                expected: self.width,
                found: coordinates.len(),
            });
        }

        let mut derivative = DVector::zeros(self.width);
        for context in &self.contexts {
            let dynamics = context.dynamics();
            let read = context.gather(coordinates);
            let contribution = dynamics
                .compute_contribution(instant, &read, &self.frame)
                .map_err(|source| Error::Contribution {
                    dynamics: dynamics.name().to_owned(),
                    source,
                })?;

            if contribution.len() != context.write_width() {
                return Err(Error::ContributionSize {
                    dynamics: dynamics.name().to_owned(),
                    expected: context.write_width(),
                    found: contribution.len(),
                });
            }

            context.scatter_add(&contribution, &mut derivative);
        }

        Ok(derivative)
    }
}

impl Equations for Aggregator {
    type Error = Error;

    fn derivative(
        &self,
        instant: Instant,
        coordinates: &DVector<f64>,
    ) -> Result<DVector<f64>, Error> {
        self.compute(instant, coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        CoordinateSubset,
        dynamics::{CentralBodyGravity, ContributionError, PositionDerivative},
    };

    fn orbital_broker() -> CoordinateBroker {
        CoordinateBroker::from_subsets([
            CoordinateSubset::cartesian_position(),
            CoordinateSubset::cartesian_velocity(),
        ])
        .expect("distinct")
    }

    /// Writes a constant acceleration into the velocity derivative.
    #[derive(Debug)]
    struct ConstantAcceleration([f64; 3]);

    impl Dynamics for ConstantAcceleration {
        fn name(&self) -> &str {
            "constant acceleration"
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
            Ok(DVector::from_column_slice(&self.0))
        }
    }

    /// Returns one value too many.
    #[derive(Debug)]
    struct Malformed;

    impl Dynamics for Malformed {
        fn name(&self) -> &str {
            "malformed"
        }

        fn read_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
            Vec::new()
        }

        fn write_subsets(&self) -> Vec<Arc<CoordinateSubset>> {
            vec![CoordinateSubset::cartesian_position()]
        }

        fn compute_contribution(
            &self,
            _instant: Instant,
            _read: &DVector<f64>,
            _frame: &Frame,
        ) -> Result<DVector<f64>, ContributionError> {
            Ok(DVector::zeros(4))
        }
    }

    #[test]
    fn contributions_to_the_same_subset_accumulate() {
        let dynamics: Vec<Arc<dyn Dynamics>> = vec![
            Arc::new(PositionDerivative::new()),
            Arc::new(ConstantAcceleration([1.0, 0.0, 0.0])),
            Arc::new(ConstantAcceleration([0.5, 2.0, 0.0])),
        ];
        let aggregator =
            Aggregator::new(&dynamics, &orbital_broker(), Frame::gcrf()).expect("resolvable");

        let x = DVector::from_vec(vec![0.0, 0.0, 0.0, 7.0, 8.0, 9.0]);
        let dx = aggregator
            .derivative(Instant::j2000(), &x)
            .expect("well formed");

        assert_eq!(dx.as_slice(), &[7.0, 8.0, 9.0, 1.5, 2.0, 0.0]);
    }

    #[test]
    fn empty_dynamics_give_zero_derivative() {
        let aggregator = Aggregator::new(&[], &orbital_broker(), Frame::gcrf()).expect("empty");
        let x = DVector::from_element(6, 3.0);

        let dx = aggregator.compute(Instant::j2000(), &x).expect("zero");

        assert_eq!(dx, DVector::zeros(6));
    }

    #[test]
    fn two_body_derivative() {
        let dynamics: Vec<Arc<dyn Dynamics>> = vec![
            Arc::new(PositionDerivative::new()),
            Arc::new(CentralBodyGravity::earth()),
        ];
        let aggregator =
            Aggregator::new(&dynamics, &orbital_broker(), Frame::gcrf()).expect("resolvable");

        let r = 7_000_000.0;
        let x = DVector::from_vec(vec![r, 0.0, 0.0, 0.0, 7_500.0, 0.0]);
        let dx = aggregator.compute(Instant::j2000(), &x).expect("finite");

        assert_relative_eq!(dx[1], 7_500.0);
        assert_relative_eq!(
            dx[3],
            -CentralBodyGravity::EARTH_GRAVITATIONAL_PARAMETER / (r * r)
        );
        assert_relative_eq!(dx[4], 0.0);
    }

    #[test]
    fn wrong_contribution_width_is_rejected() {
        let dynamics: Vec<Arc<dyn Dynamics>> = vec![Arc::new(Malformed)];
        let aggregator =
            Aggregator::new(&dynamics, &orbital_broker(), Frame::gcrf()).expect("resolvable");

        assert!(matches!(
            aggregator.compute(Instant::j2000(), &DVector::zeros(6)),
            Err(Error::ContributionSize {
                expected: 3,
                found: 4,
                ..
            })
        ));
        assert!(matches!(
            aggregator.compute(Instant::j2000(), &DVector::zeros(5)),
            Err(Error::StateWidth { .. })
        ));
    }

    #[test]
    fn unregistered_read_subset_fails_before_evaluation() {
        let dynamics: Vec<Arc<dyn Dynamics>> = vec![Arc::new(CentralBodyGravity::earth())];
        let broker = CoordinateBroker::from_subsets([CoordinateSubset::cartesian_velocity()])
            .expect("single");

        assert!(matches!(
            Aggregator::new(&dynamics, &broker, Frame::gcrf()),
            Err(Error::MissingReadSubset { .. })
        ));
    }
}
