//! Command line for the `parasol` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parasol_device::Command;

/// Remote control for the umbrella appliance.
#[derive(Parser, Debug)]
#[command(name = "parasol", version, about = "Umbrella remote with local weather")]
pub struct Cli {
    /// Config file (default: <config dir>/parasol/config.toml).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Without an action, start up, print the view and exit.
    #[command(subcommand)]
    pub action: Option<Action>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Action {
    /// Flip the confirmed power state.
    Toggle,

    /// Print the view on every change until Ctrl-C.
    Watch,

    /// Send one command: on, off, forward, backward, stop, speedup,
    /// speeddown, max, medium.
    Send {
        /// Command name or device path (e.g. `forward`, `/stop`).
        command: Command,
    },
}
