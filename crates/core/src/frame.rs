//! Reference frames.
//!
//! A [`Frame`] is a plain value identified by its name. Frames other than the
//! inertial root ([`Frame::gcrf`]) carry a [`FrameProvider`] that yields their
//! [`Transform`] into GCRF at a given instant. Transforms between two
//! arbitrary frames are composed through GCRF, so no global registry is
//! needed.

mod transform;

use std::{fmt, sync::Arc};

use nalgebra::{UnitQuaternion, Vector3};

use crate::Instant;

pub use transform::Transform;

const GCRF: &str = "GCRF";

/// Supplies the transform from a frame to GCRF.
///
/// Providers must be pure: the same instant always yields the same transform.
pub trait FrameProvider: fmt::Debug + Send + Sync {
    /// Returns the transform mapping coordinates in this frame into GCRF.
    fn transform_to_gcrf(&self, instant: Instant) -> Transform;
}

/// A named reference frame.
///
/// Two frames are equal when their names are equal.
#[derive(Clone)]
pub struct Frame {
    name: Arc<str>,
    provider: Option<Arc<dyn FrameProvider>>,
}

impl Frame {
    /// The Geocentric Celestial Reference Frame, the inertial root.
    #[must_use]
    pub fn gcrf() -> Self {
        Self {
            name: Arc::from(GCRF),
            provider: None,
        }
    }

    /// Creates a frame defined relative to GCRF by `provider`.
    #[must_use]
    pub fn new(name: &str, provider: Arc<dyn FrameProvider>) -> Self {
        Self {
            name: Arc::from(name),
            provider: Some(provider),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for frames without a provider (GCRF).
    #[must_use]
    pub fn is_inertial_root(&self) -> bool {
        self.provider.is_none()
    }

    /// Returns the transform from this frame to GCRF at `instant`.
    #[must_use]
    pub fn transform_to_gcrf(&self, instant: Instant) -> Transform {
        self.provider
            .as_ref()
            .map_or_else(Transform::identity, |provider| {
                provider.transform_to_gcrf(instant)
            })
    }

    /// Returns the transform from this frame to `other` at `instant`.
    #[must_use]
    pub fn transform_to(&self, other: &Frame, instant: Instant) -> Transform {
        if self == other {
            return Transform::identity();
        }

        let to_gcrf = self.transform_to_gcrf(instant);
        let from_gcrf = other.transform_to_gcrf(instant).inverse();
        to_gcrf.then(&from_gcrf)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Frame {}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame").field(&self.name).finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A frame spinning about the GCRF z axis at a constant rate.
///
/// At `epoch` the frame axes are rotated by `angle_at_epoch` from GCRF. This
/// is the usual first approximation of an Earth-fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRotation {
    pub epoch: Instant,
    pub angle_at_epoch: f64,
    pub rate: f64,
}

impl UniformRotation {
    /// Earth's mean sidereal rotation rate, in radians per second.
    pub const EARTH_RATE: f64 = 7.292_115_146_706_979e-5;

    #[must_use]
    pub fn earth(epoch: Instant, angle_at_epoch: f64) -> Self {
        Self {
            epoch,
            angle_at_epoch,
            rate: Self::EARTH_RATE,
        }
    }
}

impl FrameProvider for UniformRotation {
    fn transform_to_gcrf(&self, instant: Instant) -> Transform {
        let angle = self.angle_at_epoch + self.rate * instant.seconds_since(self.epoch);
        Transform {
            rotation: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
            angular_velocity: Vector3::new(0.0, 0.0, self.rate),
            ..Transform::identity()
        }
    }
}

/// A frame at a constant orientation and origin offset from GCRF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedOffset {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl FrameProvider for FixedOffset {
    fn transform_to_gcrf(&self, _instant: Instant) -> Transform {
        Transform {
            rotation: self.rotation,
            translation: self.translation,
            ..Transform::identity()
        }
    }
}
