//! Coordinate subsets and the broker that lays them out in a flat vector.

mod broker;
mod error;
mod subset;

pub use broker::CoordinateBroker;
pub use error::Error;
pub use subset::{CoordinateSubset, SubsetKind};
