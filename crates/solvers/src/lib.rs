//! Numerical solvers for trajectory propagation.
//!
//! - [`RootSolver`]: brackets and refines scalar roots
//! - [`NumericalSolver`]: explicit Runge-Kutta integration of states, with
//!   event location against an [`EventCondition`]
//!
//! Both are configured with validated, serializable configs and report
//! failures through per-module error enums.
//!
//! [`EventCondition`]: tether_core::EventCondition

pub mod numerical;
pub mod root;

pub use numerical::NumericalSolver;
pub use root::RootSolver;
