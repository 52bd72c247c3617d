//! Super Tic-Tac-Toe - command-line client
//!
//! Every command works on a directory of JSON match files, so two
//! terminals pointed at the same directory can play each other.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use super_tictactoe::engine::{GameState, Position, audit, wire};
use super_tictactoe::{AuthService, FileStore, SessionConfig, SessionController, StaticIdentity};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let identity = StaticIdentity::from_flag_or_env(cli.player.clone());

    run(config, &identity, cli.command).await
}

/// Resolves the session config from the file and CLI overrides.
#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<SessionConfig> {
    let config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    let config = match &cli.store_dir {
        Some(dir) => config.with_store_dir(dir.clone()),
        None => config,
    };
    debug!(?config, "Resolved config");
    Ok(config)
}

/// Dispatches a command.
async fn run(config: SessionConfig, identity: &StaticIdentity, command: Command) -> Result<()> {
    // The schema needs no store directory
    if let Command::Schema = command {
        return print_schema();
    }

    let store = FileStore::open(config.store_dir()).await?;
    let controller = SessionController::new(store, config);

    match command {
        Command::New { game_id } => {
            let player = identity.authenticate()?;
            let record = controller.create_match(&game_id, &player).await?;
            info!(%game_id, host = %player, "Waiting for an opponent");
            println!("{}", record.state().display());
        }
        Command::Join { game_id } => {
            let player = identity.authenticate()?;
            let record = controller.join(&game_id, &player).await?;
            println!("{}", record.state().display());
        }
        Command::Play { game_id, board, cell } => {
            let player = identity.authenticate()?;
            let (board, cell) = (parse_position(&board)?, parse_position(&cell)?);
            let record = controller.play(&game_id, &player, board, cell).await?;
            println!("{}", record.state().display());
        }
        Command::Show { game_id, json, follow } => {
            let record = controller.snapshot(&game_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", record.state().display());
            }
            if follow {
                follow_match(&controller, &game_id).await?;
            }
        }
        Command::Forfeit { game_id } => {
            let player = identity.authenticate()?;
            let record = controller.forfeit(&game_id, &player).await?;
            println!("{}", record.state().display());
        }
        Command::Expire { game_id } => {
            let record = controller.expire_turn(&game_id).await?;
            println!("{}", record.state().display());
        }
        Command::Rematch { game_id } => {
            let player = identity.authenticate()?;
            let record = controller.rematch(&game_id, &player).await?;
            println!("{}", record.state().display());
        }
        Command::List => {
            for game_id in controller.games().await? {
                println!("{}", game_id);
            }
        }
        Command::Check { target } => check(&controller, &target).await?,
        Command::Schema => print_schema()?,
    }
    Ok(())
}

/// Prints the board each time the match is written, until it ends.
///
/// Only writes made through this process are observed; watching another
/// process re-reads the file on an interval.
async fn follow_match(controller: &SessionController<FileStore>, game_id: &str) -> Result<()> {
    let mut last = controller.snapshot(game_id).await?;
    let mut updates = controller.subscribe(game_id);
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));

    while !last.state().status().is_terminal() {
        tokio::select! {
            Some(record) = updates.next() => last = record,
            _ = ticker.tick() => {
                let record = controller.snapshot(game_id).await?;
                if record.version() == last.version() {
                    continue;
                }
                last = record;
            }
        }
        println!("{}", last.state().display());
    }
    Ok(())
}

/// Accepts `0`-`8` or a position label; other numbers are passed through
/// so the engine reports them as off the board.
fn parse_position(text: &str) -> Result<usize> {
    if let Ok(index) = text.trim().parse::<usize>() {
        return Ok(index);
    }
    match Position::from_label_or_number(text) {
        Some(pos) => Ok(pos.to_index()),
        None => bail!("{:?} is not a position (use 0-8 or a label like \"top-left\")", text),
    }
}

/// Audits a stored match, or a JSON state file if `target` is a path.
#[instrument(skip(controller))]
async fn check(controller: &SessionController<FileStore>, target: &str) -> Result<()> {
    let path = std::path::Path::new(target);
    let state: GameState = if path.is_file() {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        wire::from_json(&json).with_context(|| format!("decoding {}", path.display()))?
    } else {
        controller.snapshot(target).await?.state().clone()
    };

    match audit(&state) {
        Ok(()) => {
            println!("ok: {} moves, {:?}", state.moves_played(), state.status());
            Ok(())
        }
        Err(violations) => {
            for violation in &violations {
                println!("violation: {}", violation);
            }
            bail!("{} invariant(s) violated", violations.len())
        }
    }
}

/// Prints the JSON Schema of the persisted state record.
fn print_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&wire::record_schema())?);
    Ok(())
}
