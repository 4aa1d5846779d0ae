use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Sub},
};

use uom::si::{f64::Time, time::second};

/// A point in time, measured in seconds from the J2000 epoch.
///
/// Durations are expressed with [`uom::si::f64::Time`], so an `Instant` can be
/// shifted by a `Time` and the difference of two instants is a `Time`:
///
/// ```
/// use tether_core::Instant;
/// use uom::si::{f64::Time, time::second};
///
/// let start = Instant::j2000();
/// let end = start + Time::new::<second>(60.0);
///
/// assert_eq!((end - start).get::<second>(), 60.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instant {
    seconds: f64,
}

impl Instant {
    /// The J2000 epoch.
    #[must_use]
    pub const fn j2000() -> Self {
        Self { seconds: 0.0 }
    }

    /// Creates an instant a number of seconds after J2000.
    #[must_use]
    pub const fn from_j2000_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Returns the number of seconds since J2000.
    #[must_use]
    pub const fn j2000_seconds(&self) -> f64 {
        self.seconds
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.seconds.is_finite()
    }

    /// Shifts the instant by a plain number of seconds.
    #[must_use]
    pub fn offset_seconds(&self, seconds: f64) -> Self {
        Self {
            seconds: self.seconds + seconds,
        }
    }

    /// Returns the signed number of seconds from `origin` to `self`.
    #[must_use]
    pub fn seconds_since(&self, origin: Instant) -> f64 {
        self.seconds - origin.seconds
    }

    /// Total ordering, with non-finite instants sorted as IEEE 754 does.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.seconds.total_cmp(&other.seconds)
    }
}

impl Add<Time> for Instant {
    type Output = Instant;

    fn add(self, rhs: Time) -> Self::Output {
        self.offset_seconds(rhs.get::<second>())
    }
}

impl Sub<Time> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Time) -> Self::Output {
        self.offset_seconds(-rhs.get::<second>())
    }
}

impl Sub<Instant> for Instant {
    type Output = Time;

    fn sub(self, rhs: Instant) -> Self::Output {
        Time::new::<second>(self.seconds - rhs.seconds)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J2000 {:+} s", self.seconds)
    }
}
