use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use nalgebra::{DVector, Vector3};

use crate::{Frame, Instant};

use super::{CoordinateBroker, Error};

const CARTESIAN_POSITION: &str = "CARTESIAN_POSITION";
const CARTESIAN_VELOCITY: &str = "CARTESIAN_VELOCITY";
const MASS: &str = "MASS";

/// How a subset's coordinates behave under arithmetic and frame changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsetKind {
    /// Frame-invariant values with element-wise arithmetic.
    Real,

    /// A 3-vector position, rotated and translated between frames.
    CartesianPosition,

    /// A 3-vector velocity.
    ///
    /// Converting a velocity between frames needs the matching position, so
    /// the kind names the position subset to read alongside it.
    CartesianVelocity { position: Arc<CoordinateSubset> },
}

/// A named, fixed-size slice of a state vector.
///
/// Identity is the `(name, size)` pair: two subsets built independently with
/// the same name and size are interchangeable. Subsets are immutable and are
/// shared behind an [`Arc`] by brokers, states and dynamics.
#[derive(Clone)]
pub struct CoordinateSubset {
    name: String,
    size: usize,
    kind: SubsetKind,
}

impl CoordinateSubset {
    /// Creates a frame-invariant subset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySubset`] if `size` is zero and
    /// [`Error::UnnamedSubset`] if `name` is empty.
    pub fn new(name: impl Into<String>, size: usize) -> Result<Self, Error> {
        Self::with_kind(name, size, SubsetKind::Real)
    }

    fn with_kind(name: impl Into<String>, size: usize, kind: SubsetKind) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::UnnamedSubset);
        }
        if size == 0 {
            return Err(Error::EmptySubset { name });
        }
        Ok(Self { name, size, kind })
    }

    /// The Cartesian position subset (3 components).
    #[must_use]
    pub fn cartesian_position() -> Arc<Self> {
        Arc::new(Self {
            name: CARTESIAN_POSITION.to_owned(),
            size: 3,
            kind: SubsetKind::CartesianPosition,
        })
    }

    /// The Cartesian velocity subset (3 components), paired with
    /// [`cartesian_position`](Self::cartesian_position).
    #[must_use]
    pub fn cartesian_velocity() -> Arc<Self> {
        Arc::new(Self {
            name: CARTESIAN_VELOCITY.to_owned(),
            size: 3,
            kind: SubsetKind::CartesianVelocity {
                position: Self::cartesian_position(),
            },
        })
    }

    /// The spacecraft mass subset (1 component).
    #[must_use]
    pub fn mass() -> Arc<Self> {
        Arc::new(Self {
            name: MASS.to_owned(),
            size: 1,
            kind: SubsetKind::Real,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn kind(&self) -> &SubsetKind {
        &self.kind
    }

    /// Adds this subset's coordinates from two full vectors sharing `broker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subset is absent from `broker` or a vector has
    /// the wrong width.
    pub fn add(
        &self,
        full_a: &DVector<f64>,
        full_b: &DVector<f64>,
        broker: &CoordinateBroker,
    ) -> Result<DVector<f64>, Error> {
        let a = broker.extract_coordinates(full_a, self)?;
        let b = broker.extract_coordinates(full_b, self)?;
        Ok(a + b)
    }

    /// Subtracts this subset's coordinates of `full_b` from those of `full_a`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subset is absent from `broker` or a vector has
    /// the wrong width.
    pub fn subtract(
        &self,
        full_a: &DVector<f64>,
        full_b: &DVector<f64>,
        broker: &CoordinateBroker,
    ) -> Result<DVector<f64>, Error> {
        let a = broker.extract_coordinates(full_a, self)?;
        let b = broker.extract_coordinates(full_b, self)?;
        Ok(a - b)
    }

    /// Expresses this subset's coordinates of `full` in another frame.
    ///
    /// # Errors
    ///
    /// Returns an error if this subset, or a subset it depends on, is absent
    /// from `broker`.
    pub fn in_frame(
        &self,
        instant: Instant,
        full: &DVector<f64>,
        from: &Frame,
        to: &Frame,
        broker: &CoordinateBroker,
    ) -> Result<DVector<f64>, Error> {
        let coordinates = broker.extract_coordinates(full, self)?;
        if from == to {
            return Ok(coordinates);
        }

        match &self.kind {
            SubsetKind::Real => Ok(coordinates),
            SubsetKind::CartesianPosition => {
                let transform = from.transform_to(to, instant);
                let position = transform.apply_position(&as_vector3(&coordinates));
                Ok(DVector::from_column_slice(position.as_slice()))
            }
            SubsetKind::CartesianVelocity { position } => {
                let transform = from.transform_to(to, instant);
                let position = broker.extract_coordinates(full, position)?;
                let velocity =
                    transform.apply_velocity(&as_vector3(&position), &as_vector3(&coordinates));
                Ok(DVector::from_column_slice(velocity.as_slice()))
            }
        }
    }
}

fn as_vector3(coordinates: &DVector<f64>) -> Vector3<f64> {
    Vector3::new(coordinates[0], coordinates[1], coordinates[2])
}

impl PartialEq for CoordinateSubset {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.size == other.size
    }
}

impl Eq for CoordinateSubset {}

impl Hash for CoordinateSubset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.hash(state);
    }
}

impl fmt::Debug for CoordinateSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

impl fmt::Display for CoordinateSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    use crate::frame::FixedOffset;

    fn broker() -> CoordinateBroker {
        CoordinateBroker::from_subsets([
            CoordinateSubset::cartesian_position(),
            CoordinateSubset::cartesian_velocity(),
            CoordinateSubset::mass(),
        ])
        .expect("distinct subsets")
    }

    #[test]
    fn rejects_empty_size_and_name() {
        assert!(matches!(
            CoordinateSubset::new("DRAG", 0),
            Err(Error::EmptySubset { .. })
        ));
        assert!(matches!(
            CoordinateSubset::new("", 1),
            Err(Error::UnnamedSubset)
        ));
    }

    #[test]
    fn identity_is_name_and_size() {
        let a = CoordinateSubset::new("BALLISTIC", 1).expect("valid");
        let b = CoordinateSubset::new("BALLISTIC", 1).expect("valid");
        let c = CoordinateSubset::new("BALLISTIC", 2).expect("valid");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(*CoordinateSubset::mass(), *CoordinateSubset::mass());
    }

    #[test]
    fn add_and_subtract_slice_by_subset() {
        let broker = broker();
        let a = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 100.0]);
        let b = DVector::from_vec(vec![0.5, 0.5, 0.5, 1.0, 1.0, 1.0, 10.0]);

        let velocity = CoordinateSubset::cartesian_velocity();
        let sum = velocity.add(&a, &b, &broker).expect("present");
        let difference = CoordinateSubset::mass()
            .subtract(&a, &b, &broker)
            .expect("present");

        assert_eq!(sum.as_slice(), &[5.0, 6.0, 7.0]);
        assert_eq!(difference.as_slice(), &[90.0]);
    }

    #[test]
    fn mass_is_frame_invariant_and_position_is_not() {
        let broker = broker();
        let rotated = Frame::new(
            "Rotated",
            Arc::new(FixedOffset {
                rotation: UnitQuaternion::from_axis_angle(
                    &Vector3::z_axis(),
                    std::f64::consts::FRAC_PI_2,
                ),
                translation: Vector3::zeros(),
            }),
        );
        let full = DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 500.0]);

        let mass = CoordinateSubset::mass()
            .in_frame(Instant::j2000(), &full, &Frame::gcrf(), &rotated, &broker)
            .expect("present");
        let position = CoordinateSubset::cartesian_position()
            .in_frame(Instant::j2000(), &full, &Frame::gcrf(), &rotated, &broker)
            .expect("present");

        assert_eq!(mass.as_slice(), &[500.0]);
        // GCRF x axis is the rotated frame's -y axis.
        assert_relative_eq!(position[0], 0.0, epsilon = 1e-15);
        assert_relative_eq!(position[1], -1.0, epsilon = 1e-15);
    }

    #[test]
    fn velocity_needs_position_in_broker() {
        let broker = CoordinateBroker::from_subsets([CoordinateSubset::cartesian_velocity()])
            .expect("single subset");
        let full = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let other = Frame::new(
            "Spinning",
            Arc::new(crate::frame::UniformRotation::earth(Instant::j2000(), 0.0)),
        );

        let result = CoordinateSubset::cartesian_velocity().in_frame(
            Instant::j2000(),
            &full,
            &Frame::gcrf(),
            &other,
            &broker,
        );
        assert!(matches!(result, Err(Error::MissingSubset { .. })));
    }
}
