//! Match transitions: the state machine `Waiting -> Playing -> {Win, Tie}`.
//!
//! Every transition takes the current state by reference and returns a
//! new state or a named rejection. The input is never modified, so a
//! rejected call leaves nothing to roll back.

use crate::action::{Move, MoveError};
use crate::contracts::{
    Contract, DistinctSeats, GameNotOver, IsParticipant, MoveContract, OpponentSeated, Submission,
};
use crate::routing::next_active_board;
use crate::{Cell, GameState, GameStatus, Resolution, Roster};
use tracing::{debug, info, instrument, warn};

/// Validates and applies a move.
///
/// # Errors
///
/// Returns the first failing rule, checked in this order:
/// [`MoveError::NotAParticipant`], [`MoveError::SharedSeat`],
/// [`MoveError::NotYourTurn`],
/// [`MoveError::GameAlreadyOver`], [`MoveError::WaitingForOpponent`],
/// [`MoveError::OutOfRange`], [`MoveError::CellOccupied`],
/// [`MoveError::WrongActiveBoard`], [`MoveError::BoardAlreadyDecided`].
/// Debug builds also verify the result and report
/// [`MoveError::InvariantViolation`] on a broken postcondition.
#[instrument(skip(state, roster), fields(turn = %state.turn(), status = ?state.status()))]
pub fn apply_move(
    state: &GameState,
    roster: &Roster,
    player_id: &str,
    board: usize,
    cell: usize,
) -> Result<GameState, MoveError> {
    let mov = Move::new(player_id, board, cell);
    let checked = MoveContract::pre(state, &Submission::new(roster, &mov)).inspect_err(|e| {
        debug!(error = %e, "Move rejected");
    })?;

    let mut next = state.clone();

    // Place the mark
    next.big_board
        .board_mut(checked.board)
        .set(checked.cell, Cell::Occupied(checked.symbol));

    // Resolve the sub-board just played; it was undecided before this move
    let outcome = next.big_board.board(checked.board).resolve();
    if outcome.is_decided() {
        info!(board = %checked.board, %outcome, "Sub-board decided");
        next.winners.set(checked.board, outcome);
    }

    // Route the opponent
    next.active = next_active_board(checked.cell, &next.winners);

    // Resolve the match
    next.match_winner = next.winners.resolve();
    next.status = match next.match_winner {
        Resolution::Won(_) => GameStatus::Win,
        Resolution::Draw => GameStatus::Tie,
        Resolution::Undecided => GameStatus::Playing,
    };

    // Hand the turn over, even when the match just ended
    if let Some(other) = roster.id_of(checked.symbol.opponent()) {
        next.turn = other.to_string();
    }

    if let Some(winner) = next.match_winner.winner() {
        next.score = next.score.incremented(winner);
        info!(%winner, score = ?next.score.to_pair(), "Match won");
    } else if next.status == GameStatus::Tie {
        info!("Match tied");
    }

    #[cfg(debug_assertions)]
    MoveContract::post(state, &next)?;

    Ok(next)
}

/// Starts a waiting match once both seats are filled.
///
/// Returns the state unchanged if the match already started.
///
/// # Errors
///
/// [`MoveError::WaitingForOpponent`] while the guest seat is empty;
/// [`MoveError::SharedSeat`] if the guest is the host.
#[instrument(skip(state, roster), fields(status = ?state.status()))]
pub fn start(state: &GameState, roster: &Roster) -> Result<GameState, MoveError> {
    if state.status() != GameStatus::Waiting {
        return Ok(state.clone());
    }
    OpponentSeated::check(state, roster)?;
    DistinctSeats::check(roster)?;

    let mut next = state.clone();
    next.status = GameStatus::Playing;
    info!(host = %roster.host(), guest = ?roster.guest(), "Match started");
    Ok(next)
}

/// Ends the match in favour of the forfeiting player's opponent.
///
/// This is the transition a timeout or abandonment policy applies; the
/// engine itself keeps no clock.
///
/// # Errors
///
/// [`MoveError::NotAParticipant`], [`MoveError::SharedSeat`],
/// [`MoveError::GameAlreadyOver`] or [`MoveError::WaitingForOpponent`].
#[instrument(skip(state, roster))]
pub fn forfeit(state: &GameState, roster: &Roster, player_id: &str) -> Result<GameState, MoveError> {
    let loser = IsParticipant::check(roster, player_id)?;
    DistinctSeats::check(roster)?;
    GameNotOver::check(state)?;
    if !roster.is_full() {
        return Err(MoveError::WaitingForOpponent);
    }

    let winner = loser.opponent();
    let mut next = state.clone();
    next.match_winner = Resolution::Won(winner);
    next.status = GameStatus::Win;
    next.score = next.score.incremented(winner);
    if let Some(other) = roster.id_of(winner) {
        next.turn = other.to_string();
    }
    warn!(%player_id, %winner, "Match forfeited");
    Ok(next)
}

/// Starts a new match on fresh boards, keeping the score.
///
/// X (the host) moves first again.
///
/// # Errors
///
/// [`MoveError::GameNotFinished`] unless the match is over.
#[instrument(skip(state, roster), fields(status = ?state.status()))]
pub fn rematch(state: &GameState, roster: &Roster) -> Result<GameState, MoveError> {
    if !state.status().is_terminal() {
        return Err(MoveError::GameNotFinished);
    }
    let mut next = GameState::with_score(roster, state.score());
    next.status = if roster.is_full() {
        GameStatus::Playing
    } else {
        GameStatus::Waiting
    };
    info!(score = ?next.score().to_pair(), "Rematch started");
    Ok(next)
}

/// Replays moves from the start of a fresh match.
///
/// Stops at the first rejected move. Moves after the match ends are
/// rejected with [`MoveError::GameAlreadyOver`].
#[instrument(skip(roster, moves), fields(count = moves.len()))]
pub fn replay(roster: &Roster, moves: &[Move]) -> Result<GameState, MoveError> {
    let mut state = start(&GameState::new(roster), roster)?;
    for mov in moves {
        state = apply_move(&state, roster, &mov.player, mov.board, mov.cell)?;
    }
    Ok(state)
}
