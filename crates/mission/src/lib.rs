//! Mission timelines built from propagation runs.
//!
//! - [`Segment`]: propagates a state until its event condition fires
//! - [`Sequence`]: chains segments, repeating them a number of times or
//!   until an outer condition holds
//!
//! Both return solutions holding every state visited, which downstream
//! analysis can resample or reduce to delta-v and propellant figures.

pub mod segment;
pub mod sequence;

pub use segment::{Segment, SegmentKind};
pub use sequence::Sequence;
