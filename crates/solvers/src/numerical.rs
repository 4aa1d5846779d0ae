//! Explicit Runge-Kutta integration of state vectors.
//!
//! # Algorithm
//!
//! The solver advances a [`State`] with one of the [`StepperType`] schemes,
//! forward or backward in time. The embedded pairs adapt the step so that
//! every component satisfies
//!
//! ```text
//! |error| ≤ absolute_tolerance + relative_tolerance · |value|
//! ```
//!
//! growing or shrinking the step by at most a factor of five per step. The
//! last accepted step is remembered and used as the first trial step of the
//! next call; [`NumericalSolver::reset`] forgets it.
//!
//! # Events
//!
//! [`NumericalSolver::integrate_until`] checks an [`EventCondition`] after
//! each accepted step. When it fires, a cubic Hermite interpolant across the
//! step is searched with the [`RootSolver`] for the earliest point where the
//! condition holds, and integration stops there.
//!
//! Each propagation needs its own solver value: the remembered step makes a
//! solver stateful. Solvers are cheap to clone.

mod config;
mod dense;
mod error;
mod solution;
mod tableau;


use std::ops::ControlFlow;

use nalgebra::DVector;
use tether_core::{Equations, EventCondition, Instant, State};
use tracing::{debug, trace, warn};

pub use config::{Config, ConfigError, StepperType};
pub use error::Error;
pub use solution::ConditionSolution;

use crate::root::RootSolver;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// A point on the integrated trajectory.
///
/// `t` is in seconds relative to the instant integration started from.
#[derive(Debug, Clone)]
struct Sample {
    t: f64,
    x: DVector<f64>,
    dx: DVector<f64>,
}

/// An integrator carrying its configuration and the last accepted step.
#[derive(Debug, Clone)]
pub struct NumericalSolver {
    config: Config,
    root_solver: RootSolver,
    step_hint: Option<f64>,
}

impl Default for NumericalSolver {
    fn default() -> Self {
        Self {
            config: Config::default(),
            root_solver: RootSolver::default(),
            step_hint: None,
        }
    }
}

impl NumericalSolver {
    /// Creates a solver.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            root_solver: RootSolver::new(*config.root_solver())?,
            step_hint: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The magnitude of the last accepted adaptive step, in seconds.
    #[must_use]
    pub fn step_hint(&self) -> Option<f64> {
        self.step_hint
    }

    /// Forgets the last accepted step.
    pub fn reset(&mut self) {
        self.step_hint = None;
    }

    /// Integrates `state` to `instant`.
    ///
    /// A zero-length span returns a copy of `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instant is not finite, the equations fail or
    /// misbehave, or the step size underflows.
    pub fn integrate_time<E: Equations>(
        &mut self,
        state: &State,
        instant: Instant,
        equations: &E,
    ) -> Result<State, Error> {
        check_instant(instant)?;
        if instant == state.instant() {
            return Ok(state.clone());
        }

        let origin = state.instant();
        let span = instant.seconds_since(origin);
        debug!(
            start = %origin,
            span,
            stepper = ?self.config.stepper(),
            "integrating to instant"
        );

        let start = initial_sample(state, equations)?;
        let end = self.march(origin, start, span, equations, |_, _| {
            Ok(ControlFlow::Continue(()))
        })?;

        Ok(state.with_coordinates(instant, end.x)?)
    }

    /// Integrates `state` to each of `instants`, returned in the same order.
    ///
    /// Instants after the start are visited in one forward sweep and instants
    /// before it in one backward sweep, so no span is integrated twice.
    ///
    /// # Errors
    ///
    /// See [`NumericalSolver::integrate_time`].
    pub fn integrate_times<E: Equations>(
        &mut self,
        state: &State,
        instants: &[Instant],
        equations: &E,
    ) -> Result<Vec<State>, Error> {
        for instant in instants {
            check_instant(*instant)?;
        }

        let origin = state.instant();
        let (mut forward, mut backward): (Vec<usize>, Vec<usize>) =
            (0..instants.len()).partition(|&index| instants[index] >= origin);
        forward.sort_by(|&a, &b| instants[a].total_cmp(&instants[b]));
        backward.sort_by(|&a, &b| instants[b].total_cmp(&instants[a]));

        let mut results = Vec::with_capacity(instants.len());
        for sweep in [forward, backward] {
            let mut current = state.clone();
            for index in sweep {
                current = self.integrate_time(&current, instants[index], equations)?;
                results.push((index, current.clone()));
            }
        }

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, state)| state).collect())
    }

    /// Integrates `state` toward `instant` until `condition` fires.
    ///
    /// The condition is checked against each accepted step. When it fires,
    /// the crossing is located within the step and the returned state is the
    /// first point found where the condition holds. If it never fires, the
    /// state at `instant` is returned with `condition_is_satisfied` unset.
    ///
    /// The condition's target must already be resolved; see
    /// [`EventCondition::update_target`].
    ///
    /// # Errors
    ///
    /// Returns an error if the condition or the event location fails, or for
    /// any reason listed on [`NumericalSolver::integrate_time`].
    pub fn integrate_until<E, C>(
        &mut self,
        state: &State,
        instant: Instant,
        equations: &E,
        condition: &C,
    ) -> Result<ConditionSolution, Error>
    where
        E: Equations,
        C: EventCondition + ?Sized,
    {
        check_instant(instant)?;
        let origin = state.instant();
        let span = instant.seconds_since(origin);
        debug!(
            start = %origin,
            span,
            condition = condition.name(),
            stepper = ?self.config.stepper(),
            "integrating until condition"
        );

        if span == 0.0 {
            return Ok(ConditionSolution {
                state: state.clone(),
                states: vec![state.clone()],
                condition_is_satisfied: condition.is_satisfied(state, state)?,
                iterations: 0,
                root_solver_has_converged: false,
            });
        }

        let root_solver = self.root_solver;
        let mut states = vec![state.clone()];
        let mut event: Option<(State, usize, bool)> = None;

        let start = initial_sample(state, equations)?;
        let end = self.march(origin, start, span, equations, |previous, current| {
            let previous_state = state.with_coordinates(
                origin.offset_seconds(previous.t),
                previous.x.clone(),
            )?;
            let current_state =
                state.with_coordinates(origin.offset_seconds(current.t), current.x.clone())?;

            if !condition.is_satisfied(&current_state, &previous_state)? {
                states.push(current_state);
                return Ok(ControlFlow::Continue(()));
            }

            let located = locate(
                &root_solver,
                state,
                origin,
                (previous, &previous_state),
                (current, current_state),
                condition,
            )?;
            event = Some(located);
            Ok(ControlFlow::Break(()))
        })?;

        let Some((located, iterations, converged)) = event else {
            let last = state.with_coordinates(instant, end.x)?;
            if let Some(final_sample) = states.last_mut() {
                *final_sample = last.clone();
            }
            debug!(end = %instant, "condition not reached");
            return Ok(ConditionSolution {
                state: last,
                states,
                condition_is_satisfied: false,
                iterations: 0,
                root_solver_has_converged: false,
            });
        };

        debug!(end = %located.instant(), iterations, "condition reached");
        states.push(located.clone());
        Ok(ConditionSolution {
            state: located,
            states,
            condition_is_satisfied: true,
            iterations,
            root_solver_has_converged: converged,
        })
    }

    /// Steps from `start` to `end` seconds after `origin`, calling `visit`
    /// with each accepted `(previous, current)` pair until it breaks.
    ///
    /// Returns the last accepted sample.
    fn march<E, V>(
        &mut self,
        origin: Instant,
        start: Sample,
        end: f64,
        equations: &E,
        mut visit: V,
    ) -> Result<Sample, Error>
    where
        E: Equations,
        V: FnMut(&Sample, &Sample) -> Result<ControlFlow<()>, Error>,
    {
        let tableau = self.config.stepper().tableau();
        let adaptive = self.config.stepper().is_adaptive();
        let direction = if end >= start.t { 1.0 } else { -1.0 };
        let atol = self.config.absolute_tolerance();
        let rtol = self.config.relative_tolerance();

        let first = match self.step_hint {
            Some(hint) if adaptive => hint,
            _ => self.config.time_step_seconds(),
        };
        let mut h = first.abs() * direction;
        let mut current = start;
        let (mut accepted, mut rejected) = (0_usize, 0_usize);

        while (end - current.t) * direction > 0.0 {
            let remaining = end - current.t;
            let truncated = h.abs() >= remaining.abs();
            let step = if truncated { remaining } else { h };

            let attempt = tableau.step(equations, origin, &current, step)?;
            let norm = match &attempt.error {
                Some(error) => error_norm(error, &current.x, &attempt.x, atol, rtol),
                None => 0.0,
            };

            if norm > 1.0 {
                rejected += 1;
                let factor = (SAFETY * norm.powf(-tableau.error_exponent)).clamp(MIN_FACTOR, 1.0);
                h = step * factor;
                trace!(t = current.t, step, norm, "rejected step");
                if h.abs() < 16.0 * f64::EPSILON * current.t.abs().max(1.0) {
                    return Err(Error::StepSizeUnderflow {
                        instant: origin.offset_seconds(current.t),
                        step: h,
                    });
                }
                continue;
            }

            let t = if truncated { end } else { current.t + step };
            let dx = match attempt.end_derivative {
                Some(dx) => dx,
                None => evaluate(equations, origin, t, &attempt.x)?,
            };
            if !is_finite(&attempt.x) || !is_finite(&dx) {
                return Err(Error::NonFiniteState {
                    instant: origin.offset_seconds(t),
                });
            }

            accepted += 1;
            trace!(t, step, norm, "accepted step");
            if adaptive {
                let factor = if norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * norm.powf(-tableau.error_exponent)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                if !truncated {
                    h = step * factor;
                    self.step_hint = Some(h.abs());
                }
            }

            let next = Sample {
                t,
                x: attempt.x,
                dx,
            };
            let flow = visit(&current, &next)?;
            current = next;
            if flow.is_break() {
                break;
            }
        }

        debug!(accepted, rejected, t = current.t, "integration finished");
        Ok(current)
    }
}

/// Locates where `condition` first holds within an accepted step.
///
/// The step is parametrised by `θ ∈ [0, 1]` and searched for the change of
/// `g(θ) = ±1`, satisfied or not against the step's start. The satisfied end
/// of the final bracket is returned.
fn locate<C: EventCondition + ?Sized>(
    root_solver: &RootSolver,
    template: &State,
    origin: Instant,
    (start, start_state): (&Sample, &State),
    (end, end_state): (&Sample, State),
    condition: &C,
) -> Result<(State, usize, bool), Error> {
    if condition.is_satisfied(start_state, start_state)? {
        return Ok((start_state.clone(), 0, true));
    }

    let interpolate = |theta: f64| -> Result<State, Error> {
        let t = dense::time_at(start, end, theta);
        let x = dense::hermite(start, end, theta);
        Ok(template.with_coordinates(origin.offset_seconds(t), x)?)
    };
    let g = |theta: f64| -> Result<f64, Error> {
        let sample = interpolate(theta)?;
        Ok(if condition.is_satisfied(&sample, start_state)? {
            1.0
        } else {
            -1.0
        })
    };

    let solution = root_solver.bracket_and_solve_from(g, 0.5, 0.5, true)?;
    if !solution.has_converged() {
        warn!(
            condition = condition.name(),
            iters = solution.iters,
            bracket = ?solution.bracket,
            "event location did not converge"
        );
    }

    let located = interpolate(solution.bracket[1])?;
    let located = if condition.is_satisfied(&located, start_state)? {
        located
    } else {
        end_state
    };

    Ok((located, solution.iters, solution.has_converged()))
}

fn initial_sample<E: Equations>(state: &State, equations: &E) -> Result<Sample, Error> {
    let x = state.coordinates().clone();
    let dx = evaluate(equations, state.instant(), 0.0, &x)?;
    Ok(Sample { t: 0.0, x, dx })
}

fn evaluate<E: Equations>(
    equations: &E,
    origin: Instant,
    t: f64,
    x: &DVector<f64>,
) -> Result<DVector<f64>, Error> {
    let dx = equations
        .derivative(origin.offset_seconds(t), x)
        .map_err(Error::equations)?;
    if dx.len() != x.len() {
        return Err(Error::DerivativeWidth {
            expected: x.len(),
            found: dx.len(),
        });
    }
    Ok(dx)
}

fn check_instant(instant: Instant) -> Result<(), Error> {
    if instant.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFiniteInstant { instant })
    }
}

fn is_finite(x: &DVector<f64>) -> bool {
    x.iter().all(|value| value.is_finite())
}

/// Largest component of the error relative to its tolerance.
///
/// Non-finite states or errors give an infinite norm, so the step is
/// rejected.
fn error_norm(
    error: &DVector<f64>,
    start: &DVector<f64>,
    end: &DVector<f64>,
    atol: f64,
    rtol: f64,
) -> f64 {
    let mut norm: f64 = 0.0;
    for ((e, a), b) in error.iter().zip(start.iter()).zip(end.iter()) {
        let scaled = e.abs() / (atol + rtol * a.abs().max(b.abs()));
        if !scaled.is_finite() {
            return f64::INFINITY;
        }
        norm = norm.max(scaled);
    }
    norm
}
