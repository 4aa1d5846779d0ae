/// Indicates whether the solver converged or hit the iteration limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The bracket shrank below the configured tolerance, or a zero was hit.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,
}

/// The result of a root search.
///
/// Running out of iterations is not an error: the solution then holds the
/// best estimate and the bracket it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Final solver status.
    pub status: Status,

    /// Best estimate of the root.
    pub root: f64,

    /// Function evaluations spent, bracketing included.
    pub iters: usize,

    /// The final bracket, ordered `[lower, upper]`.
    pub bracket: [f64; 2],
}

impl Solution {
    #[must_use]
    pub fn has_converged(&self) -> bool {
        self.status == Status::Converged
    }
}
