//! First-class invariants for Super Tic-Tac-Toe.
//!
//! Invariants are logical properties that must hold after every
//! transition. State invariants look at one snapshot; transition
//! invariants compare a state with its successor.

mod active_board;
mod alternating_marks;
mod monotonic_board;
mod outcome_coupling;
mod settled_boards;

pub use active_board::ActiveBoardInvariant;
pub use alternating_marks::AlternatingMarksInvariant;
pub use monotonic_board::{FrozenOutcomesInvariant, MonotonicBoardInvariant};
pub use outcome_coupling::OutcomeCouplingInvariant;
pub use settled_boards::SettledBoardsInvariant;

use crate::GameState;
use tracing::{instrument, warn};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// A property relating a state to its successor.
pub trait TransitionInvariant<S> {
    /// Checks if the invariant holds across `before -> after`.
    fn holds(before: &S, after: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of [`Invariant`]s.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>,)+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$inv::holds(state) {
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);

/// Every per-state invariant of a match.
pub type GameInvariants = (
    AlternatingMarksInvariant,
    OutcomeCouplingInvariant,
    ActiveBoardInvariant,
    SettledBoardsInvariant,
);

/// Checks a state received from elsewhere against every game invariant.
///
/// Reports all violations rather than stopping at the first.
#[instrument(skip(state))]
pub fn audit(state: &GameState) -> Result<(), Vec<InvariantViolation>> {
    GameInvariants::check_all(state).inspect_err(|violations| {
        warn!(count = violations.len(), "State failed audit");
    })
}

/// Checks the transition invariants across `before -> after`.
pub fn check_transition(before: &GameState, after: &GameState) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = Vec::new();
    if !MonotonicBoardInvariant::holds(before, after) {
        violations.push(InvariantViolation::new(
            <MonotonicBoardInvariant as TransitionInvariant<GameState>>::description(),
        ));
    }
    if !FrozenOutcomesInvariant::holds(before, after) {
        violations.push(InvariantViolation::new(
            <FrozenOutcomesInvariant as TransitionInvariant<GameState>>::description(),
        ));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
