//! Immutable state vectors and the builder that lays them out.
//!
//! A [`State`] couples an instant, a flat coordinate vector, the frame those
//! coordinates are expressed in, and the [`CoordinateBroker`] describing the
//! layout. States are never mutated: conversions and arithmetic return new
//! states.

mod builder;
mod error;

use std::sync::Arc;

use nalgebra::DVector;

use crate::{CoordinateBroker, CoordinateSubset, Frame, Instant};

pub use builder::StateBuilder;
pub use error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    instant: Instant,
    coordinates: DVector<f64>,
    frame: Frame,
    broker: Arc<CoordinateBroker>,
}

impl State {
    /// Creates a state, checking the coordinate width against the broker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if `coordinates` is not as wide as
    /// the broker layout.
    pub fn new(
        instant: Instant,
        coordinates: DVector<f64>,
        frame: Frame,
        broker: Arc<CoordinateBroker>,
    ) -> Result<Self, Error> {
        if coordinates.len() != broker.width() {
            return Err(Error::WidthMismatch {
                expected: broker.width(),
                found: coordinates.len(),
            });
        }

        Ok(Self {
            instant,
            coordinates,
            frame,
            broker,
        })
    }

    #[must_use]
    pub fn instant(&self) -> Instant {
        self.instant
    }

    #[must_use]
    pub fn coordinates(&self) -> &DVector<f64> {
        &self.coordinates
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub fn broker(&self) -> &Arc<CoordinateBroker> {
        &self.broker
    }

    /// Width of the coordinate vector.
    #[must_use]
    pub fn size(&self) -> usize {
        self.coordinates.len()
    }

    #[must_use]
    pub fn has_subset(&self, subset: &CoordinateSubset) -> bool {
        self.broker.has_subset(subset)
    }

    /// Returns the coordinates of one subset.
    ///
    /// # Errors
    ///
    /// Returns an error if the subset is not part of this state's layout.
    pub fn extract_coordinate(&self, subset: &CoordinateSubset) -> Result<DVector<f64>, Error> {
        Ok(self.broker.extract_coordinates(&self.coordinates, subset)?)
    }

    /// Returns the concatenated coordinates of several subsets.
    ///
    /// # Errors
    ///
    /// Returns an error if any subset is not part of this state's layout.
    pub fn extract_coordinates(
        &self,
        subsets: &[Arc<CoordinateSubset>],
    ) -> Result<DVector<f64>, Error> {
        Ok(self
            .broker
            .extract_coordinates_many(&self.coordinates, subsets)?)
    }

    /// Returns a copy of this state with different coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] if the width changes.
    pub fn with_coordinates(&self, instant: Instant, coordinates: DVector<f64>) -> Result<Self, Error> {
        Self::new(instant, coordinates, self.frame.clone(), Arc::clone(&self.broker))
    }

    /// Expresses this state in another frame.
    ///
    /// Each subset converts its own slice; frame-invariant subsets are copied
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a subset's conversion needs a coordinate that is
    /// not part of this state's layout.
    pub fn in_frame(&self, frame: &Frame) -> Result<Self, Error> {
        if *frame == self.frame {
            return Ok(self.clone());
        }

        let mut converted = Vec::with_capacity(self.size());
        for subset in self.broker.subsets() {
            let slice = subset.in_frame(
                self.instant,
                &self.coordinates,
                &self.frame,
                frame,
                &self.broker,
            )?;
            converted.extend_from_slice(slice.as_slice());
        }

        Self::new(
            self.instant,
            DVector::from_vec(converted),
            frame.clone(),
            Arc::clone(&self.broker),
        )
    }

    /// Adds two states subset by subset.
    ///
    /// # Errors
    ///
    /// Returns an error unless both states share instant, frame and layout.
    pub fn try_add(&self, other: &State) -> Result<Self, Error> {
        self.combine(other, |subset, a, b, broker| subset.add(a, b, broker))
    }

    /// Subtracts `other` from this state subset by subset.
    ///
    /// # Errors
    ///
    /// Returns an error unless both states share instant, frame and layout.
    pub fn try_sub(&self, other: &State) -> Result<Self, Error> {
        self.combine(other, |subset, a, b, broker| subset.subtract(a, b, broker))
    }

    fn combine<F>(&self, other: &State, op: F) -> Result<Self, Error>
    where
        F: Fn(
            &CoordinateSubset,
            &DVector<f64>,
            &DVector<f64>,
            &CoordinateBroker,
        ) -> Result<DVector<f64>, crate::coordinate::Error>,
    {
        self.check_compatible(other)?;

        let mut combined = Vec::with_capacity(self.size());
        for subset in self.broker.subsets() {
            let slice = op(subset.as_ref(), &self.coordinates, &other.coordinates, &self.broker)?;
            combined.extend_from_slice(slice.as_slice());
        }

        self.with_coordinates(self.instant, DVector::from_vec(combined))
    }

    fn check_compatible(&self, other: &State) -> Result<(), Error> {
        if !Arc::ptr_eq(&self.broker, &other.broker) && *self.broker != *other.broker {
            return Err(Error::BrokerMismatch);
        }
        if self.instant != other.instant {
            return Err(Error::InstantMismatch {
                left: self.instant,
                right: other.instant,
            });
        }
        if self.frame != other.frame {
            return Err(Error::FrameMismatch {
                left: self.frame.name().to_owned(),
                right: other.frame.name().to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::frame::UniformRotation;

    fn orbital_broker() -> Arc<CoordinateBroker> {
        Arc::new(
            CoordinateBroker::from_subsets([
                CoordinateSubset::cartesian_position(),
                CoordinateSubset::cartesian_velocity(),
                CoordinateSubset::mass(),
            ])
            .expect("distinct"),
        )
    }

    fn orbital_state(instant: Instant, values: [f64; 7]) -> State {
        State::new(
            instant,
            DVector::from_column_slice(&values),
            Frame::gcrf(),
            orbital_broker(),
        )
        .expect("valid width")
    }

    #[test]
    fn new_checks_width() {
        let result = State::new(
            Instant::j2000(),
            DVector::zeros(6),
            Frame::gcrf(),
            orbital_broker(),
        );
        assert!(matches!(
            result,
            Err(Error::WidthMismatch {
                expected: 7,
                found: 6
            })
        ));
    }

    #[test]
    fn frame_round_trip_recovers_state() {
        let instant = Instant::from_j2000_seconds(86_400.0);
        let state = orbital_state(
            instant,
            [7_000_000.0, -12_000.0, 3_000.0, 10.0, 7_500.0, 1.0, 250.0],
        );
        let itrf = Frame::new(
            "ITRF",
            Arc::new(UniformRotation::earth(Instant::j2000(), 1.2)),
        );

        let converted = state.in_frame(&itrf).expect("convertible");
        let back = converted.in_frame(&Frame::gcrf()).expect("convertible");

        assert_eq!(converted.frame(), &itrf);
        assert_eq!(back.frame(), &Frame::gcrf());
        assert_relative_eq!(
            back.coordinates(),
            state.coordinates(),
            epsilon = 1e-8,
            max_relative = 1e-12
        );
        assert_relative_eq!(converted.coordinates()[6], 250.0);
    }

    #[test]
    fn arithmetic_requires_matching_instant_and_frame() {
        let a = orbital_state(Instant::j2000(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let b = orbital_state(Instant::j2000(), [1.0; 7]);
        let later = orbital_state(Instant::from_j2000_seconds(1.0), [1.0; 7]);

        let sum = a.try_add(&b).expect("compatible");
        let difference = a.try_sub(&b).expect("compatible");

        assert_eq!(
            sum.coordinates().as_slice(),
            &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
        assert_eq!(
            difference.coordinates().as_slice(),
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert!(matches!(
            a.try_add(&later),
            Err(Error::InstantMismatch { .. })
        ));

        let other_frame = b
            .in_frame(&Frame::new(
                "ITRF",
                Arc::new(UniformRotation::earth(Instant::j2000(), 0.0)),
            ))
            .expect("convertible");
        assert!(matches!(
            a.try_sub(&other_frame),
            Err(Error::FrameMismatch { .. })
        ));
    }

    #[test]
    fn arithmetic_rejects_different_layouts() {
        let a = orbital_state(Instant::j2000(), [0.0; 7]);
        let broker = Arc::new(
            CoordinateBroker::from_subsets([
                CoordinateSubset::cartesian_velocity(),
                CoordinateSubset::cartesian_position(),
                CoordinateSubset::mass(),
            ])
            .expect("distinct"),
        );
        let b = State::new(Instant::j2000(), DVector::zeros(7), Frame::gcrf(), broker)
            .expect("valid width");

        assert!(matches!(a.try_add(&b), Err(Error::BrokerMismatch)));
    }

    #[test]
    fn extracts_subsets() {
        let state = orbital_state(Instant::j2000(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        let velocity = state
            .extract_coordinate(&CoordinateSubset::cartesian_velocity())
            .expect("present");
        let packed = state
            .extract_coordinates(&[CoordinateSubset::mass(), CoordinateSubset::cartesian_position()])
            .expect("present");

        assert_eq!(velocity.as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(packed.as_slice(), &[7.0, 1.0, 2.0, 3.0]);
    }
}
