//! Contract-based validation for Super Tic-Tac-Toe.
//!
//! Contracts define correctness through preconditions and postconditions:
//! `{P(state, move)} apply {Q(before, after)}`. Preconditions run in a
//! fixed order and stop at the first failure.

use crate::action::{Move, MoveError};
use crate::invariants::{audit, check_transition, InvariantViolation};
use crate::{ActiveBoard, GameState, GameStatus, Player, Position, Roster};
use tracing::{debug, instrument};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// What a passing precondition check hands to the transition.
    type Checked;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<Self::Checked, MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

/// A move together with the roster it is judged against.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    /// Participants of the match.
    pub roster: &'a Roster,
    /// The proposed move.
    pub mov: &'a Move,
}

impl<'a> Submission<'a> {
    /// Pairs a move with its roster.
    pub fn new(roster: &'a Roster, mov: &'a Move) -> Self {
        Self { roster, mov }
    }
}

/// A move that passed every precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedMove {
    /// Symbol of the acting participant.
    pub symbol: Player,
    /// Target sub-board.
    pub board: Position,
    /// Target cell.
    pub cell: Position,
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the acting identity is seated in the match.
pub struct IsParticipant;

impl IsParticipant {
    /// Returns the acting participant's symbol.
    pub fn check(roster: &Roster, player_id: &str) -> Result<Player, MoveError> {
        roster
            .symbol_of(player_id)
            .ok_or_else(|| MoveError::NotAParticipant(player_id.to_string()))
    }
}

/// Precondition: host and guest are different identities.
pub struct DistinctSeats;

impl DistinctSeats {
    /// Rejects a roster whose guest is the host.
    pub fn check(roster: &Roster) -> Result<(), MoveError> {
        match roster.guest() {
            Some(guest) if guest == roster.host() => Err(MoveError::SharedSeat(guest.to_string())),
            _ => Ok(()),
        }
    }
}

/// Precondition: the mover's symbol is the one the marks on the board call for.
pub struct SymbolToMove;

impl SymbolToMove {
    /// Rejects a mark that would break X/O alternation.
    pub fn check(state: &GameState, symbol: Player) -> Result<(), MoveError> {
        if state.symbol_to_move() == symbol {
            Ok(())
        } else {
            Err(MoveError::NotYourTurn)
        }
    }
}

/// Precondition: the acting identity holds the turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Rejects a mover who does not hold the turn.
    pub fn check(state: &GameState, player_id: &str) -> Result<(), MoveError> {
        if state.turn() != player_id {
            Err(MoveError::NotYourTurn)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the match has not ended.
pub struct GameNotOver;

impl GameNotOver {
    /// Rejects any action on a finished match.
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        if state.status().is_terminal() {
            Err(MoveError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: a waiting match may start only with both seats filled.
pub struct OpponentSeated;

impl OpponentSeated {
    /// Rejects a first move while the guest seat is empty.
    pub fn check(state: &GameState, roster: &Roster) -> Result<(), MoveError> {
        if state.status() == GameStatus::Waiting && !roster.is_full() {
            Err(MoveError::WaitingForOpponent)
        } else {
            Ok(())
        }
    }
}

/// Precondition: both indices name a position.
pub struct InRange;

impl InRange {
    /// Converts both indices into positions.
    pub fn check(mov: &Move) -> Result<(Position, Position), MoveError> {
        match (Position::from_index(mov.board), Position::from_index(mov.cell)) {
            (Some(board), Some(cell)) => Ok((board, cell)),
            _ => Err(MoveError::OutOfRange {
                board: mov.board,
                cell: mov.cell,
            }),
        }
    }
}

/// Precondition: the target cell is empty.
pub struct CellIsEmpty;

impl CellIsEmpty {
    /// Rejects an occupied target cell.
    pub fn check(state: &GameState, board: Position, cell: Position) -> Result<(), MoveError> {
        if state.big_board().board(board).is_empty(cell) {
            Ok(())
        } else {
            Err(MoveError::CellOccupied { board, cell })
        }
    }
}

/// Precondition: the move respects the active-board constraint.
///
/// A constraint naming a decided sub-board is waived even if the stored
/// index was never normalized.
pub struct RespectsActiveBoard;

impl RespectsActiveBoard {
    /// Rejects a move outside the required sub-board.
    pub fn check(state: &GameState, board: Position) -> Result<(), MoveError> {
        match state.active_board() {
            ActiveBoard::Only(required)
                if required != board && !state.winners().is_decided(required) =>
            {
                Err(MoveError::WrongActiveBoard { required })
            }
            _ => Ok(()),
        }
    }
}

/// Precondition: the target sub-board is still undecided.
pub struct BoardIsOpen;

impl BoardIsOpen {
    /// Rejects a move into a decided sub-board.
    pub fn check(state: &GameState, board: Position) -> Result<(), MoveError> {
        if state.winners().is_decided(board) {
            Err(MoveError::BoardAlreadyDecided(board))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition: every rule a move must satisfy, in order.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(state, roster), fields(player = %mov.player, board = mov.board, cell = mov.cell))]
    pub fn check(state: &GameState, roster: &Roster, mov: &Move) -> Result<CheckedMove, MoveError> {
        let symbol = IsParticipant::check(roster, &mov.player)?;
        DistinctSeats::check(roster)?;
        PlayersTurn::check(state, &mov.player)?;
        GameNotOver::check(state)?;
        SymbolToMove::check(state, symbol)?;
        OpponentSeated::check(state, roster)?;
        let (board, cell) = InRange::check(mov)?;
        CellIsEmpty::check(state, board, cell)?;
        RespectsActiveBoard::check(state, board)?;
        BoardIsOpen::check(state, board)?;
        debug!(?symbol, %board, %cell, "Move is legal");
        Ok(CheckedMove { symbol, board, cell })
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions: [`LegalMove`].
///
/// Postconditions:
/// - Cells are monotonic
/// - Decided sub-boards are frozen
/// - Every per-state invariant holds on the result
pub struct MoveContract;

impl<'a> Contract<GameState, Submission<'a>> for MoveContract {
    type Checked = CheckedMove;

    fn pre(state: &GameState, action: &Submission<'a>) -> Result<CheckedMove, MoveError> {
        LegalMove::check(state, action.roster, action.mov)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), MoveError> {
        let mut violations = check_transition(before, after).err().unwrap_or_default();
        violations.extend(audit(after).err().unwrap_or_default());
        if violations.is_empty() {
            Ok(())
        } else {
            Err(describe(&violations))
        }
    }
}

fn describe(violations: &[InvariantViolation]) -> MoveError {
    let descriptions = violations
        .iter()
        .map(|v| v.description.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{apply_move, start, Cell};

    fn started() -> (Roster, GameState) {
        let roster = Roster::paired("host", "guest");
        let state = start(&GameState::new(&roster), &roster).expect("both seated");
        (roster, state)
    }

    #[test]
    fn test_precondition_passes_on_open_board() {
        let (roster, state) = started();
        let mov = Move::new("host", 0, 4);
        let checked = MoveContract::pre(&state, &Submission::new(&roster, &mov)).expect("legal");
        assert_eq!(checked.symbol, Player::X);
        assert_eq!(checked.board, Position::TopLeft);
        assert_eq!(checked.cell, Position::Center);
    }

    #[test]
    fn test_participant_checked_before_turn() {
        let (roster, state) = started();
        let mov = Move::new("mallory", 0, 4);
        assert_eq!(
            LegalMove::check(&state, &roster, &mov),
            Err(MoveError::NotAParticipant("mallory".to_string()))
        );
    }

    #[test]
    fn test_turn_checked_before_range() {
        let (roster, state) = started();
        let mov = Move::new("guest", 42, 4);
        assert_eq!(LegalMove::check(&state, &roster, &mov), Err(MoveError::NotYourTurn));
    }

    #[test]
    fn test_shared_seat_rejected() {
        let roster = Roster::paired("a", "a");
        let err = start(&GameState::new(&roster), &roster).unwrap_err();
        assert_eq!(err, MoveError::SharedSeat("a".to_string()));

        let state = start(&GameState::new(&Roster::paired("a", "b")), &Roster::paired("a", "b"))
            .expect("both seated");
        let mov = Move::new("a", 0, 4);
        assert_eq!(
            LegalMove::check(&state, &roster, &mov),
            Err(MoveError::SharedSeat("a".to_string()))
        );
        assert_eq!(
            crate::forfeit(&state, &roster, "a"),
            Err(MoveError::SharedSeat("a".to_string()))
        );
    }

    #[test]
    fn test_mark_must_alternate() {
        // A stored turn that names the host while O is due.
        let (roster, state) = started();
        let mut state = apply_move(&state, &roster, "host", 0, 4).expect("legal");
        state.turn = "host".to_string();
        assert_eq!(
            LegalMove::check(&state, &roster, &Move::new("host", 4, 0)),
            Err(MoveError::NotYourTurn)
        );
    }

    #[test]
    fn test_waiting_without_guest() {
        let roster = Roster::new("host");
        let state = GameState::new(&roster);
        let mov = Move::new("host", 0, 0);
        assert_eq!(
            LegalMove::check(&state, &roster, &mov),
            Err(MoveError::WaitingForOpponent)
        );
    }

    #[test]
    fn test_waiting_with_both_seated_accepts_first_move() {
        let roster = Roster::paired("host", "guest");
        let state = GameState::new(&roster);
        assert!(LegalMove::check(&state, &roster, &Move::new("host", 0, 0)).is_ok());
    }

    #[test]
    fn test_stale_active_board_is_waived() {
        let (_, mut state) = started();
        state.winners.set(Position::Center, crate::Resolution::Draw);
        state.active = ActiveBoard::Only(Position::Center);
        assert!(RespectsActiveBoard::check(&state, Position::TopLeft).is_ok());
        assert_eq!(
            BoardIsOpen::check(&state, Position::Center),
            Err(MoveError::BoardAlreadyDecided(Position::Center))
        );
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let (roster, before) = started();
        let after = apply_move(&before, &roster, "host", 0, 4).expect("legal");
        assert!(MoveContract::post(&before, &after).is_ok());
    }

    #[test]
    fn test_postcondition_detects_corruption() {
        let (roster, before) = started();
        let mut after = apply_move(&before, &roster, "host", 0, 4).expect("legal");
        after
            .big_board
            .board_mut(Position::TopLeft)
            .set(Position::TopLeft, Cell::Occupied(Player::X));
        assert!(matches!(
            MoveContract::post(&before, &after),
            Err(MoveError::InvariantViolation(_))
        ));
    }
}
