// Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use pilotsync_core::ControlRequest;

/// Watch and drive an in-vehicle dashboard backend from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pilotsync", version, about)]
pub struct Cli {
    /// Backend host[:port] (overrides the config file)
    #[arg(long, global = true, env = "PILOTSYNC_HOST")]
    pub host: Option<String>,

    /// Use wss/https
    #[arg(long, global = true)]
    pub secure: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log file path (logs go to stderr when unset)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream store changes as JSON lines (the default)
    Watch {
        /// Exit after this long (e.g. "30s"); runs until Ctrl-C otherwise
        #[arg(long, value_parser = humantime::parse_duration)]
        duration: Option<Duration>,
    },

    /// Send a control request to the backend
    Request {
        #[arg(value_enum)]
        action: RequestAction,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Write the effective configuration to the config file
    Init,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestAction {
    Previous,
    Next,
    PlayPause,
    CheckUpdate,
    ConfirmUpdate,
}

impl From<RequestAction> for ControlRequest {
    fn from(action: RequestAction) -> Self {
        match action {
            RequestAction::Previous => Self::PreviousTrack,
            RequestAction::Next => Self::NextTrack,
            RequestAction::PlayPause => Self::TogglePlayback,
            RequestAction::CheckUpdate => Self::CheckForUpdate,
            RequestAction::ConfirmUpdate => Self::ConfirmUpdate,
        }
    }
}
