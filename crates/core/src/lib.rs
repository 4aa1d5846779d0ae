//! State vectors, dynamics and event conditions for trajectory propagation.
//!
//! This crate defines the data model and the seams that integrators and
//! mission planning build on:
//!
//! - [`Instant`] and [`Frame`], the time and reference-frame values
//! - [`CoordinateSubset`] and [`CoordinateBroker`], which lay named slices
//!   out in one flat vector
//! - [`State`] and [`StateBuilder`], immutable samples of that vector
//! - [`Dynamics`], a contribution to the derivative, and
//!   [`dynamics::Aggregator`], which sums contributions into [`Equations`]
//! - [`EventCondition`] and [`Condition`], predicates that stop propagation

pub mod condition;
pub mod coordinate;
pub mod dynamics;
mod equations;
pub mod frame;
pub mod state;
mod time;

pub use condition::{Condition, EventCondition};
pub use coordinate::{CoordinateBroker, CoordinateSubset};
pub use dynamics::Dynamics;
pub use equations::Equations;
pub use frame::Frame;
pub use state::{State, StateBuilder};
pub use time::Instant;
