use nalgebra::{UnitQuaternion, Vector3};

/// A rigid, possibly rotating, change of reference frame.
///
/// A transform maps coordinates expressed in a *source* frame into a
/// *destination* frame:
///
/// ```text
/// r' = R r + t
/// v' = R v + ω × (R r) + ṫ
/// ```
///
/// where `R` is [`rotation`](Self::rotation), `t` is the source origin in the
/// destination frame, `ṫ` its velocity, and `ω` the angular velocity of the
/// source axes relative to the destination, expressed in the destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
}

impl Transform {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    /// A pure rotation with no relative motion.
    #[must_use]
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            rotation,
            ..Self::identity()
        }
    }

    #[must_use]
    pub fn apply_position(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * position + self.translation
    }

    #[must_use]
    pub fn apply_velocity(&self, position: &Vector3<f64>, velocity: &Vector3<f64>) -> Vector3<f64> {
        let rotated = self.rotation * position;
        self.rotation * velocity + self.angular_velocity.cross(&rotated) + self.velocity
    }

    /// Returns the transform mapping the destination back to the source.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let translation = rotation * self.translation;
        let angular_velocity = rotation * self.angular_velocity;

        Self {
            rotation,
            translation: -translation,
            velocity: angular_velocity.cross(&translation) - rotation * self.velocity,
            angular_velocity: -angular_velocity,
        }
    }

    /// Composes `self` followed by `next`.
    ///
    /// If `self` maps A → B and `next` maps B → C, the result maps A → C.
    #[must_use]
    pub fn then(&self, next: &Transform) -> Self {
        let translation = next.rotation * self.translation;

        Self {
            rotation: next.rotation * self.rotation,
            translation: translation + next.translation,
            velocity: next.rotation * self.velocity
                + next.angular_velocity.cross(&translation)
                + next.velocity,
            angular_velocity: next.rotation * self.angular_velocity + next.angular_velocity,
        }
    }
}
