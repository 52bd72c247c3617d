//! Core domain types for Super Tic-Tac-Toe.

use crate::Position;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Unique identifier for a participant, as issued by the identity provider.
pub type PlayerId = String;

/// Player symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Player {
    /// Player X (goes first, held by the host).
    X,
    /// Player O (goes second, held by the guest).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// A cell of a sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a player.
    Occupied(Player),
}

impl Cell {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }
}

/// Resolved outcome of a sub-board, or of the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    /// Still in play.
    #[default]
    Undecided,
    /// Three in a row for a player.
    Won(Player),
    /// No line can be completed by either player.
    Draw,
}

impl Resolution {
    /// True once the outcome is fixed.
    pub fn is_decided(self) -> bool {
        !matches!(self, Resolution::Undecided)
    }

    /// Returns the winning player, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            Resolution::Won(player) => Some(player),
            Resolution::Undecided | Resolution::Draw => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Undecided => write!(f, "undecided"),
            Resolution::Won(player) => write!(f, "{} wins", player),
            Resolution::Draw => write!(f, "draw"),
        }
    }
}

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Fewer than two players have started the match.
    #[default]
    Waiting,
    /// Moves are being played.
    Playing,
    /// A player won the match.
    Win,
    /// The match ended without a winner.
    Tie,
}

impl GameStatus {
    /// `Win` and `Tie` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Win | GameStatus::Tie)
    }
}

/// Which sub-board the next mover must play in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveBoard {
    /// Any undecided sub-board (`-1` on the wire).
    #[default]
    Any,
    /// Exactly this sub-board.
    Only(Position),
}

impl ActiveBoard {
    /// Wire representation in `[-1, 8]`.
    pub fn to_wire(self) -> i8 {
        match self {
            ActiveBoard::Any => -1,
            ActiveBoard::Only(pos) => pos.to_index() as i8,
        }
    }

    /// Parses the wire representation. Values outside `[-1, 8]` yield `None`.
    pub fn from_wire(value: i64) -> Option<Self> {
        if value == -1 {
            return Some(ActiveBoard::Any);
        }
        usize::try_from(value)
            .ok()
            .and_then(Position::from_index)
            .map(ActiveBoard::Only)
    }
}

/// Running match counts; index 0 on the wire belongs to X, index 1 to O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Score {
    x: u32,
    o: u32,
}

impl Score {
    /// Creates a score pair.
    pub fn new(x: u32, o: u32) -> Self {
        Self { x, o }
    }

    /// Wins recorded for a player.
    pub fn of(&self, player: Player) -> u32 {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    /// Returns a copy with one more win for `player`.
    pub(crate) fn incremented(self, player: Player) -> Self {
        match player {
            Player::X => Self { x: self.x.saturating_add(1), ..self },
            Player::O => Self { o: self.o.saturating_add(1), ..self },
        }
    }

    /// `[x, o]` as stored.
    pub fn to_pair(self) -> [u32; 2] {
        [self.x, self.o]
    }
}

/// The two participants of a match.
///
/// The host always holds X and the guest O. The identity provider
/// resolves who is who; the engine takes the roster as fixed input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Roster {
    host: PlayerId,
    guest: Option<PlayerId>,
}

impl Roster {
    /// Creates a roster with only the host seated.
    pub fn new(host: impl Into<PlayerId>) -> Self {
        Self {
            host: host.into(),
            guest: None,
        }
    }

    /// Creates a roster with both seats filled.
    pub fn paired(host: impl Into<PlayerId>, guest: impl Into<PlayerId>) -> Self {
        Self {
            host: host.into(),
            guest: Some(guest.into()),
        }
    }

    /// Host identity (X).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Guest identity (O), once joined.
    pub fn guest(&self) -> Option<&str> {
        self.guest.as_deref()
    }

    /// Seats the guest. Returns a new roster.
    pub fn with_guest(&self, guest: impl Into<PlayerId>) -> Self {
        Self {
            host: self.host.clone(),
            guest: Some(guest.into()),
        }
    }

    /// True once both seats are filled.
    pub fn is_full(&self) -> bool {
        self.guest.is_some()
    }

    /// Symbol held by `player_id`, if it is a participant.
    pub fn symbol_of(&self, player_id: &str) -> Option<Player> {
        if self.host == player_id {
            Some(Player::X)
        } else if self.guest.as_deref() == Some(player_id) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// Identity holding `symbol`, if seated.
    pub fn id_of(&self, symbol: Player) -> Option<&str> {
        match symbol {
            Player::X => Some(self.host.as_str()),
            Player::O => self.guest.as_deref(),
        }
    }
}
