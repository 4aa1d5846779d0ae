use std::sync::Arc;

use nalgebra::DVector;

use crate::{CoordinateBroker, CoordinateSubset, Frame, Instant, coordinate};

use super::{Error, State};

/// Builds states sharing one frame and one coordinate layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBuilder {
    frame: Frame,
    broker: Arc<CoordinateBroker>,
}

impl StateBuilder {
    /// Creates a builder laying out `subsets` in iteration order.
    ///
    /// # Errors
    ///
    /// Returns an error if a subset is listed twice.
    pub fn new<I>(frame: Frame, subsets: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Arc<CoordinateSubset>>,
    {
        let broker = CoordinateBroker::from_subsets(subsets)?;
        Ok(Self::with_broker(frame, Arc::new(broker)))
    }

    #[must_use]
    pub fn with_broker(frame: Frame, broker: Arc<CoordinateBroker>) -> Self {
        Self { frame, broker }
    }

    /// A builder matching the frame and layout of an existing state.
    #[must_use]
    pub fn from_state(state: &State) -> Self {
        Self::with_broker(state.frame().clone(), Arc::clone(state.broker()))
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub fn broker(&self) -> &Arc<CoordinateBroker> {
        &self.broker
    }

    /// Builds a state from a full coordinate vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WidthMismatch`] unless `coordinates` matches the
    /// layout width.
    pub fn build(&self, instant: Instant, coordinates: DVector<f64>) -> Result<State, Error> {
        State::new(
            instant,
            coordinates,
            self.frame.clone(),
            Arc::clone(&self.broker),
        )
    }

    /// Keeps only the builder's subsets of `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` is in another frame or lacks one of the
    /// builder's subsets.
    pub fn reduce(&self, state: &State) -> Result<State, Error> {
        self.check_frame(state)?;
        let coordinates = state.extract_coordinates(self.broker.subsets())?;
        self.build(state.instant(), coordinates)
    }

    /// Lays `state` out with the builder's subsets, taking any subset missing
    /// from `state` out of `default_state`.
    ///
    /// The result keeps the instant of `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if either state is in another frame, or if a subset
    /// is in neither state.
    pub fn expand(&self, state: &State, default_state: &State) -> Result<State, Error> {
        self.check_frame(state)?;
        self.check_frame(default_state)?;

        let mut coordinates = Vec::with_capacity(self.broker.width());
        for subset in self.broker.subsets() {
            let source = if state.has_subset(subset) {
                state
            } else if default_state.has_subset(subset) {
                default_state
            } else {
                return Err(Error::UnresolvedSubset {
                    name: subset.name().to_owned(),
                });
            };
            coordinates.extend_from_slice(source.extract_coordinate(subset)?.as_slice());
        }

        self.build(state.instant(), DVector::from_vec(coordinates))
    }

    /// Returns a builder with `subset` appended to the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the subset is already part of the layout.
    pub fn with_subset(&self, subset: Arc<CoordinateSubset>) -> Result<Self, Error> {
        let mut broker = (*self.broker).clone();
        broker.add_subset(subset)?;
        Ok(Self::with_broker(self.frame.clone(), Arc::new(broker)))
    }

    /// Returns a builder with `subset` removed from the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the subset is not part of the layout.
    pub fn without_subset(&self, subset: &CoordinateSubset) -> Result<Self, Error> {
        if !self.broker.has_subset(subset) {
            return Err(coordinate::Error::MissingSubset {
                name: subset.name().to_owned(),
            }
            .into());
        }

        let remaining = self
            .broker
            .subsets()
            .iter()
            .filter(|registered| ***registered != *subset)
            .cloned();
        Self::new(self.frame.clone(), remaining)
    }

    fn check_frame(&self, state: &State) -> Result<(), Error> {
        if *state.frame() == self.frame {
            Ok(())
        } else {
            Err(Error::FrameMismatch {
                left: self.frame.name().to_owned(),
                right: state.frame().name().to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_velocity() -> StateBuilder {
        StateBuilder::new(
            Frame::gcrf(),
            [
                CoordinateSubset::cartesian_position(),
                CoordinateSubset::cartesian_velocity(),
            ],
        )
        .expect("distinct")
    }

    #[test]
    fn build_validates_width() {
        let builder = position_velocity();

        assert!(builder.build(Instant::j2000(), DVector::zeros(6)).is_ok());
        assert!(matches!(
            builder.build(Instant::j2000(), DVector::zeros(7)),
            Err(Error::WidthMismatch {
                expected: 6,
                found: 7
            })
        ));
    }

    #[test]
    fn reduce_keeps_builder_subsets() {
        let full = position_velocity()
            .with_subset(CoordinateSubset::mass())
            .expect("new subset");
        let state = full
            .build(
                Instant::j2000(),
                DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            )
            .expect("valid");

        let mass_only =
            StateBuilder::new(Frame::gcrf(), [CoordinateSubset::mass()]).expect("single");
        let reduced = mass_only.reduce(&state).expect("mass present");

        assert_eq!(reduced.coordinates().as_slice(), &[7.0]);
        assert_eq!(reduced.instant(), state.instant());
    }

    #[test]
    fn expand_fills_missing_subsets_from_default() {
        let state = position_velocity()
            .build(
                Instant::from_j2000_seconds(5.0),
                DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            )
            .expect("valid");
        let defaults = StateBuilder::new(Frame::gcrf(), [CoordinateSubset::mass()])
            .expect("single")
            .build(Instant::j2000(), DVector::from_vec(vec![120.0]))
            .expect("valid");

        let expanded_builder = StateBuilder::new(
            Frame::gcrf(),
            [
                CoordinateSubset::mass(),
                CoordinateSubset::cartesian_position(),
                CoordinateSubset::cartesian_velocity(),
            ],
        )
        .expect("distinct");
        let expanded = expanded_builder
            .expand(&state, &defaults)
            .expect("all subsets resolvable");

        assert_eq!(
            expanded.coordinates().as_slice(),
            &[120.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(expanded.instant(), Instant::from_j2000_seconds(5.0));
    }

    #[test]
    fn expand_fails_when_subset_is_nowhere() {
        let state = position_velocity()
            .build(Instant::j2000(), DVector::zeros(6))
            .expect("valid");
        let builder = position_velocity()
            .with_subset(CoordinateSubset::mass())
            .expect("new subset");

        assert!(matches!(
            builder.expand(&state, &state),
            Err(Error::UnresolvedSubset { .. })
        ));
    }

    #[test]
    fn without_subset_shrinks_layout() {
        let builder = position_velocity()
            .without_subset(&CoordinateSubset::cartesian_velocity())
            .expect("present");

        assert_eq!(builder.broker().width(), 3);
        assert!(matches!(
            builder.without_subset(&CoordinateSubset::mass()),
            Err(Error::Coordinate(coordinate::Error::MissingSubset { .. }))
        ));
    }

    #[test]
    fn reduce_rejects_other_frames() {
        use crate::frame::UniformRotation;

        let state = position_velocity()
            .build(Instant::j2000(), DVector::zeros(6))
            .expect("valid");
        let itrf = Frame::new(
            "ITRF",
            Arc::new(UniformRotation::earth(Instant::j2000(), 0.0)),
        );
        let builder =
            StateBuilder::new(itrf, [CoordinateSubset::cartesian_position()]).expect("single");

        assert!(matches!(
            builder.reduce(&state),
            Err(Error::FrameMismatch { .. })
        ));
    }
}
