use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Log text marking the start of the player's main phase.
pub const DEFAULT_TRIGGER: &str = "tag=STEP value=MAIN_ACTION";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "log-streamer",
    version,
    about = "Streams a Hearthstone log to the suggestion server and prints its advice",
    long_about = None
)]
pub struct Cli {
    /// Preferences file (TOML). Missing file means defaults.
    #[arg(short, long, default_value = "hearthcoach.toml")]
    pub config: PathBuf,

    /// Override the server host from the preferences file
    #[arg(long)]
    pub host: Option<String>,

    /// Override the server port from the preferences file
    #[arg(long)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Follow a log (or stdin) and print suggestions as they arrive (default)
    Stream {
        /// Log file to follow; reads stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Log lines containing this text trigger a suggestion request
        #[arg(long, default_value = DEFAULT_TRIGGER)]
        trigger: String,
    },
    /// Probe the server's health endpoint and exit
    Health,
    /// Post one game state (JSON file) and print the suggestion
    SuggestOnce {
        /// File holding a `GameState` as JSON
        state: PathBuf,
    },
}
