//! Command-line interface for super_tictactoe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Super Tic-Tac-Toe - play matches stored as JSON files
#[derive(Parser, Debug)]
#[command(name = "super_tictactoe")]
#[command(about = "Play Super Tic-Tac-Toe matches from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML session config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding match files (overrides the config)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Acting player id (defaults to $SUPER_TICTACTOE_PLAYER)
    #[arg(short, long, global = true)]
    pub player: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a new match hosted by the acting player (X)
    New {
        /// Match id (letters, digits, '-' and '_')
        game_id: String,
    },

    /// Take the guest seat (O) and start the match
    Join {
        /// Match id
        game_id: String,
    },

    /// Place a mark
    Play {
        /// Match id
        game_id: String,

        /// Sub-board: 0-8 or a label such as "top-left"
        board: String,

        /// Cell within the sub-board: 0-8 or a label
        cell: String,
    },

    /// Print the board
    Show {
        /// Match id
        game_id: String,

        /// Print the stored JSON record instead of the board
        #[arg(long)]
        json: bool,

        /// Keep printing the board as other players move
        #[arg(long)]
        follow: bool,
    },

    /// Concede the match
    Forfeit {
        /// Match id
        game_id: String,
    },

    /// Forfeit the player on turn if their time ran out
    Expire {
        /// Match id
        game_id: String,
    },

    /// Start the next match after one ends, keeping the score
    Rematch {
        /// Match id
        game_id: String,
    },

    /// Audit a stored match or a JSON state file for rule violations
    Check {
        /// Match id, or a path to a JSON state record
        target: String,
    },

    /// List stored matches
    List,

    /// Print the JSON Schema of the state record
    Schema,
}
