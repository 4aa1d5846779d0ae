use tether_core::State;

/// The result of integrating until an event condition.
///
/// Not reaching the condition is a normal outcome: `state` is then the state
/// at the target instant and `condition_is_satisfied` is false.
#[derive(Debug, Clone)]
pub struct ConditionSolution {
    /// The state where integration stopped.
    pub state: State,

    /// Every accepted sample, starting with the initial state and ending with
    /// `state`.
    pub states: Vec<State>,

    /// Whether the condition fired before the target instant.
    pub condition_is_satisfied: bool,

    /// Root solver evaluations spent locating the event.
    pub iterations: usize,

    /// Whether the event location converged to tolerance.
    pub root_solver_has_converged: bool,
}
