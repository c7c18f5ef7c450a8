//! Command-line interface for strictly_reversi.

use crate::config::SessionConfig;
use crate::selector::SelectorKind;
use clap::{Args, Parser, Subcommand};
use derive_more::{Display, Error};
use std::path::PathBuf;
use std::str::FromStr;
use strictly_reversi::{Coordinate, Turn};

/// Strictly Reversi - reversi in the terminal with automated opponents
#[derive(Parser, Debug)]
#[command(name = "strictly_reversi")]
#[command(about = "Play reversi against automated opponents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML session config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game on stdin/stdout
    Play(PlayArgs),

    /// Print the saved game
    Show {
        /// Save file to read (defaults to the config's save_path)
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

/// Overrides for a played session.
#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Let the automator play the first (dark) side
    #[arg(long)]
    pub first_automated: bool,

    /// Let the automator play the second (light) side
    #[arg(long)]
    pub second_automated: bool,

    /// Play both sides yourself
    #[arg(long, conflicts_with_all = ["first_automated", "second_automated"])]
    pub no_automation: bool,

    /// Automator strategy
    #[arg(long, value_enum)]
    pub selector: Option<SelectorKind>,

    /// Delay before each automated move, in milliseconds
    #[arg(long)]
    pub think_millis: Option<u64>,

    /// JSON file mirroring the game
    #[arg(long)]
    pub save: Option<PathBuf>,
}

impl PlayArgs {
    /// Applies these flags on top of `config`.
    pub fn apply(&self, config: SessionConfig) -> SessionConfig {
        let (first, second) = if self.no_automation {
            (false, false)
        } else if self.first_automated || self.second_automated {
            (self.first_automated, self.second_automated)
        } else {
            (*config.first_automated(), *config.second_automated())
        };
        SessionConfig::new(
            first,
            second,
            self.selector.unwrap_or(*config.selector()),
            self.think_millis.unwrap_or(*config.think_millis()),
            self.save.clone().or_else(|| config.save_path().clone()),
        )
    }
}

/// One line typed during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Place at a coordinate, e.g. `f5`.
    Place(Coordinate),
    /// `pass`
    Pass,
    /// `reset`
    Reset,
    /// `auto first on`, `auto second off`, ...
    Automate {
        /// Side to toggle.
        turn: Turn,
        /// New setting.
        automated: bool,
    },
    /// `board`
    Board,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Text that is not a recognised [`Input`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unrecognised input {:?}; type help for commands", input)]
pub struct ParseInputError {
    /// The rejected line.
    pub input: String,
}

/// Commands understood during play.
pub const HELP: &str = "\
commands:
  f5                     place at a coordinate
  pass                   pass when you have no move
  reset                  start over
  auto first|second on|off
                         toggle the automator for a side
  board                  print the board
  help                   show this help
  quit                   leave";

impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseInputError {
            input: s.trim().to_string(),
        };
        let words: Vec<String> = s.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();

        match words.as_slice() {
            ["pass"] => Ok(Input::Pass),
            ["reset"] => Ok(Input::Reset),
            ["board"] => Ok(Input::Board),
            ["help" | "?"] => Ok(Input::Help),
            ["quit" | "exit" | "q"] => Ok(Input::Quit),
            ["auto", side, setting] => {
                let turn = match *side {
                    "first" | "dark" => Turn::First,
                    "second" | "light" => Turn::Second,
                    _ => return Err(err()),
                };
                let automated = match *setting {
                    "on" => true,
                    "off" => false,
                    _ => return Err(err()),
                };
                Ok(Input::Automate { turn, automated })
            }
            [coordinate] => coordinate.parse().map(Input::Place).map_err(|_| err()),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inputs() {
        assert_eq!(
            "F5".parse::<Input>(),
            Ok(Input::Place("f5".parse().unwrap()))
        );
        assert_eq!(" pass ".parse::<Input>(), Ok(Input::Pass));
        assert_eq!(
            "auto second off".parse::<Input>(),
            Ok(Input::Automate {
                turn: Turn::Second,
                automated: false
            })
        );
        assert_eq!("q".parse::<Input>(), Ok(Input::Quit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "z9", "auto third on", "auto first maybe", "pass now"] {
            assert!(input.parse::<Input>().is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = SessionConfig::default();
        let args = PlayArgs {
            first_automated: true,
            selector: Some(SelectorKind::First),
            think_millis: Some(0),
            ..PlayArgs::default()
        };
        let merged = args.apply(config);
        assert!(*merged.first_automated());
        assert!(!*merged.second_automated());
        assert_eq!(*merged.selector(), SelectorKind::First);
        assert_eq!(*merged.think_millis(), 0);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let config = SessionConfig::default();
        let merged = PlayArgs::default().apply(config.clone());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_cli_parses_play_flags() {
        let cli = Cli::parse_from([
            "strictly_reversi",
            "play",
            "--first-automated",
            "--selector",
            "random",
        ]);
        let Command::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert!(args.first_automated);
        assert_eq!(args.selector, Some(SelectorKind::Random));
    }
}
