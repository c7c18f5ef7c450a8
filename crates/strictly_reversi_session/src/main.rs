//! Strictly Reversi - terminal driver
//!
//! Reads commands from stdin, prints the board to stdout and logs to stderr.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use strictly_reversi::{AnimationRequest, GameCommand, GameCommandEntry, GameModelState};
use strictly_reversi_session::{
    AutomatorSelection, Cli, Command, GameStateStore, GameWithAutomatorsModel, HELP, Input,
    JsonFileStore, MemoryStore, SessionConfig, SessionState,
};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Command::Play(args) => run_play(args.apply(config)).await,
        Command::Show { save } => run_show(save.or_else(|| config.save_path().clone())),
    }
}

/// Something the play loop reacts to.
enum Event {
    Selection(AutomatorSelection),
    Line(Option<String>),
}

/// Run an interactive game
#[instrument(skip(config), fields(selector = %config.selector()))]
async fn run_play(config: SessionConfig) -> Result<()> {
    let store: Box<dyn GameStateStore> = match config.save_path() {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };
    let mut session =
        GameWithAutomatorsModel::new(config.build_selector(), config.availabilities(), store);
    let mut commands = session.game().subscribe_commands();

    // Blocking stdin lives on its own thread so quitting never waits for a line.
    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    info!("Starting interactive game");
    println!("{HELP}\n");
    print_status(&session);
    let mut input_open = true;

    loop {
        if !input_open && !session.automator().is_working() {
            debug!("Input closed and automator idle");
            break;
        }

        let event = tokio::select! {
            selection = session.next_automator_selection() => Event::Selection(selection),
            line = line_rx.recv(), if input_open => Event::Line(line),
        };

        match event {
            Event::Selection(selection) => {
                if let Err(desync) = session.apply_automator_selection(selection) {
                    println!("automator failed: {desync}");
                }
            }
            Event::Line(None) => input_open = false,
            Event::Line(Some(line)) if line.trim().is_empty() => continue,
            Event::Line(Some(line)) => match line.parse::<Input>() {
                Err(error) => println!("{error}"),
                Ok(Input::Quit) => break,
                Ok(Input::Help) => println!("{HELP}"),
                Ok(Input::Board) => print_status(&session),
                Ok(Input::Place(coordinate)) => {
                    if let Err(error) = session.place(coordinate) {
                        println!("{error}");
                    }
                }
                Ok(Input::Pass) => {
                    if let Err(error) = session.pass() {
                        println!("{error}");
                    }
                }
                Ok(Input::Reset) => {
                    session.reset();
                }
                Ok(Input::Automate { turn, automated }) => {
                    session.set_automation(turn, automated);
                    println!(
                        "{turn} is now played by {}",
                        if automated { "the automator" } else { "you" }
                    );
                }
            },
        }

        if drain_commands(&mut commands) {
            play_animation(&mut session);
            print_status(&session);
        }
    }

    info!("Leaving game");
    Ok(())
}

/// Prints every newly accepted command. Returns whether there were any.
fn drain_commands(
    commands: &mut tokio::sync::broadcast::Receiver<GameCommandEntry>,
) -> bool {
    let mut any = false;
    loop {
        match commands.try_recv() {
            Ok(entry) => {
                any = true;
                match entry.command {
                    GameCommand::Placed { turn, selected } => println!(
                        "{turn} plays {} flipping {}",
                        selected.coordinate(),
                        selected.flip_count()
                    ),
                    GameCommand::Passed { turn } => println!("{turn} passes"),
                    GameCommand::Reset => println!("new game"),
                }
            }
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed accepted commands");
                any = true;
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return any,
        }
    }
}

/// Walks the latest animation to its end, printing each step.
fn play_animation(session: &mut GameWithAutomatorsModel) {
    let mut request = session.animation().request();
    loop {
        match request {
            AnimationRequest::Place { at, disk } => println!("  {disk} placed on {at}"),
            AnimationRequest::Flip { at, disk } => println!("  {at} turns {disk}"),
            AnimationRequest::Sync(_) => return,
        }
        match session.mark_animation_as_completed() {
            Ok(state) => request = state.request(),
            Err(_) => return,
        }
    }
}

fn print_status(session: &GameWithAutomatorsModel) {
    println!("\n{}", session.game().game_state());
    match session.state() {
        SessionState::Failed { reason, .. } => {
            println!("automator failed: {reason}\ntype reset to start over");
        }
        SessionState::Playing(GameModelState::Completed { result, .. }) => {
            println!("game over: {result}");
        }
        SessionState::Playing(GameModelState::Ready { state, candidates }) => {
            let turn = state.turn();
            if session.availabilities().is_automated(turn) {
                println!("{turn} (automator) is thinking");
            } else if candidates.is_empty() {
                println!("{turn} has no move; type pass");
            } else {
                let moves: Vec<String> = candidates
                    .iter()
                    .map(|candidate| candidate.coordinate().to_string())
                    .collect();
                println!("{turn} moves: {}", moves.join(" "));
            }
        }
    }
}

/// Print the saved game
#[instrument]
fn run_show(save: Option<PathBuf>) -> Result<()> {
    let path = save.context("no save file; pass --save or set save_path in the config")?;
    let store = JsonFileStore::new(&path);

    let Some(state) = store.load()? else {
        println!("no saved game at {}", path.display());
        return Ok(());
    };

    println!("{state}");
    match GameModelState::from_game_state(state) {
        GameModelState::Completed { result, .. } => println!("game over: {result}"),
        GameModelState::Ready { candidates, .. } if candidates.is_empty() => {
            println!("{} has no move and must pass", state.turn());
        }
        GameModelState::Ready { candidates, .. } => {
            let moves: Vec<String> = candidates
                .iter()
                .map(|candidate| candidate.coordinate().to_string())
                .collect();
            println!("moves: {}", moves.join(" "));
        }
    }
    Ok(())
}
