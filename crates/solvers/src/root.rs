//! Scalar root finding.
//!
//! # Algorithm
//!
//! [`RootSolver::bracket_and_solve`] starts from a guess and walks away from
//! it, doubling the step, until the function changes sign. The direction of
//! the walk follows from the sign at the guess and whether the function is
//! rising. The resulting bracket is then refined with Brent's method, which
//! mixes inverse quadratic interpolation, secant steps and bisection and never
//! leaves the bracket.
//!
//! [`RootSolver::solve`] refines a bracket the caller already has, and
//! [`RootSolver::bisection`] is the plain halving fallback.
//!
//! # Convergence
//!
//! A search converges once the bracket half-width drops below
//! `x_abs_tol + x_rel_tol·|x|`, or when the function is exactly zero.
//! Exhausting [`Config::max_iters`] is not an error: the [`Solution`] reports
//! [`Status::MaxIters`] with the best estimate so far.

mod bracket;
mod config;
mod error;
mod solution;


use std::error::Error as StdError;

use tracing::trace;

pub use bracket::BracketError;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use solution::{Solution, Status};

use bracket::{check_bounds, sorted, straddles};

/// A scalar root finder with a fixed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootSolver {
    config: Config,
}

/// Iteration bookkeeping shared by the bracketing and refinement phases.
struct Budget {
    used: usize,
    max: usize,
}

impl Budget {
    fn exhausted(&self) -> bool {
        self.used >= self.max
    }
}

impl RootSolver {
    /// Creates a solver.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Brackets a root starting from `guess`, then refines it.
    ///
    /// The first step is `|guess|`, or `1` when the guess is zero.
    ///
    /// # Errors
    ///
    /// See [`RootSolver::bracket_and_solve_from`].
    pub fn bracket_and_solve<F, E>(
        &self,
        f: F,
        guess: f64,
        is_rising: bool,
    ) -> Result<Solution, Error>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        let step = if guess == 0.0 { 1.0 } else { guess.abs() };
        self.bracket_and_solve_from(f, guess, step, is_rising)
    }

    /// Brackets a root starting from `guess` with an explicit first step.
    ///
    /// A rising function that is positive at the guess is searched below it,
    /// and above it otherwise; a falling function the other way around. The
    /// step doubles after each evaluation without a sign change.
    ///
    /// # Errors
    ///
    /// Returns an error if the guess or step is invalid, the function fails or
    /// is not finite, or no sign change is found within the iteration budget.
    pub fn bracket_and_solve_from<F, E>(
        &self,
        mut f: F,
        guess: f64,
        step: f64,
        is_rising: bool,
    ) -> Result<Solution, Error>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        if !guess.is_finite() || !step.is_finite() || step <= 0.0 {
            return Err(Error::InvalidGuess { guess, step });
        }

        let mut budget = Budget {
            used: 0,
            max: self.config.max_iters(),
        };
        let f_guess = evaluate(&mut f, guess, &mut budget)?;
        if f_guess == 0.0 {
            return Ok(Solution {
                status: Status::Converged,
                root: guess,
                iters: budget.used,
                bracket: [guess, guess],
            });
        }

        let direction = if (f_guess > 0.0) == is_rising { -1.0 } else { 1.0 };
        let (mut a, mut fa) = (guess, f_guess);
        let mut step = step;

        loop {
            if budget.exhausted() {
                return Err(Error::NoBracket {
                    guess,
                    iters: budget.used,
                });
            }

            let b = a + direction * step;
            let fb = evaluate(&mut f, b, &mut budget)?;
            trace!(a, b, fa, fb, "expanding bracket");

            if straddles(fa, fb) {
                return brent(&mut f, [a, b], [fa, fb], &self.config, &mut budget);
            }

            a = b;
            fa = fb;
            step *= 2.0;
        }
    }

    /// Refines a root within `[lower, upper]` using Brent's method.
    ///
    /// # Errors
    ///
    /// Returns an error if the bracket is invalid or does not straddle a sign
    /// change, or if the function fails or is not finite.
    pub fn solve<F, E>(&self, mut f: F, lower: f64, upper: f64) -> Result<Solution, Error>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        check_bounds(lower, upper)?;
        let mut budget = Budget {
            used: 0,
            max: self.config.max_iters(),
        };
        let f_lower = evaluate(&mut f, lower, &mut budget)?;
        let f_upper = evaluate(&mut f, upper, &mut budget)?;
        if !straddles(f_lower, f_upper) {
            return Err(BracketError::NoSignChange { lower, upper }.into());
        }

        brent(&mut f, [lower, upper], [f_lower, f_upper], &self.config, &mut budget)
    }

    /// Halves `[lower, upper]` until it is within tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the bracket is invalid or does not straddle a sign
    /// change, or if the function fails or is not finite.
    pub fn bisection<F, E>(&self, mut f: F, lower: f64, upper: f64) -> Result<Solution, Error>
    where
        F: FnMut(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        check_bounds(lower, upper)?;
        let mut budget = Budget {
            used: 0,
            max: self.config.max_iters(),
        };
        let (mut a, mut b) = (lower, upper);
        let mut fa = evaluate(&mut f, a, &mut budget)?;
        let fb = evaluate(&mut f, b, &mut budget)?;
        if !straddles(fa, fb) {
            return Err(BracketError::NoSignChange { lower, upper }.into());
        }
        if fa == 0.0 {
            return Ok(converged(a, [a, a], budget.used));
        }
        if fb == 0.0 {
            return Ok(converged(b, [b, b], budget.used));
        }

        loop {
            let mid = 0.5 * (a + b);
            if 0.5 * (b - a).abs() <= self.config.tolerance_at(mid) {
                return Ok(converged(mid, sorted(a, b), budget.used));
            }
            if budget.exhausted() {
                return Ok(Solution {
                    status: Status::MaxIters,
                    root: mid,
                    iters: budget.used,
                    bracket: sorted(a, b),
                });
            }

            let f_mid = evaluate(&mut f, mid, &mut budget)?;
            if f_mid == 0.0 {
                return Ok(converged(mid, [mid, mid], budget.used));
            }
            if straddles(fa, f_mid) {
                b = mid;
            } else {
                a = mid;
                fa = f_mid;
            }
        }
    }
}

fn converged(root: f64, bracket: [f64; 2], iters: usize) -> Solution {
    Solution {
        status: Status::Converged,
        root,
        iters,
        bracket,
    }
}

fn evaluate<F, E>(f: &mut F, x: f64, budget: &mut Budget) -> Result<f64, Error>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    budget.used += 1;
    let value = f(x).map_err(Error::function)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFiniteValue { x })
    }
}

/// Brent's method on a bracket known to straddle a sign change.
///
/// `b` is the current best estimate, `a` the previous one and `c` the point
/// that keeps the root bracketed with `b`.
fn brent<F, E>(
    f: &mut F,
    [a0, b0]: [f64; 2],
    [fa0, fb0]: [f64; 2],
    config: &Config,
    budget: &mut Budget,
) -> Result<Solution, Error>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let (mut a, mut b, mut c) = (a0, b0, b0);
    let (mut fa, mut fb, mut fc) = (fa0, fb0, fb0);
    let mut d = b - a;
    let mut e = d;

    loop {
        if !straddles(fb, fc) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.tolerance_at(b);
        let half_width = 0.5 * (c - b);
        if half_width.abs() <= tol || fb == 0.0 {
            return Ok(converged(b, sorted(b, c), budget.used));
        }
        if budget.exhausted() {
            return Ok(Solution {
                status: Status::MaxIters,
                root: b,
                iters: budget.used,
                bracket: sorted(b, c),
            });
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * half_width * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * half_width * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let interpolation_limit = 3.0 * half_width * q - (tol * q).abs();
            let step_limit = (e * q).abs();
            if 2.0 * p < interpolation_limit.min(step_limit) {
                e = d;
                d = p / q;
            } else {
                d = half_width;
                e = d;
            }
        } else {
            d = half_width;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else {
            tol.copysign(half_width)
        };
        fb = evaluate(f, b, budget)?;
    }
}
