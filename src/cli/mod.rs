//! CLI entry point for wxo-bridge.

pub mod logging;

use clap::{Parser, Subcommand};

/// wxo-bridge CLI
#[derive(Parser, Debug)]
#[command(name = "wxo-bridge", version, about = "watsonx Orchestrate agent bridge")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a bearer token and show a masked preview
    Token,
    /// List agents deployed on the instance
    Agents,
    /// List agent keys from the local agent table
    Routes,
    /// Send a message to an agent id
    Run(RunArgs),
    /// Send a message to an agent from the agent table
    Ask(AskArgs),
}

impl Commands {
    /// Whether the command reads the local agent table.
    pub fn uses_agent_table(&self) -> bool {
        matches!(self, Self::Routes | Self::Ask(_))
    }
}

/// Arguments for `wxo-bridge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Remote agent id
    pub agent_id: String,

    /// Message to send
    pub message: String,

    /// Continue an existing thread
    #[arg(short, long)]
    pub thread: Option<String>,
}

/// Arguments for `wxo-bridge ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Agent key in the agent table (e.g. diet, calendar)
    pub key: String,

    /// Message to send; defaults to the agent's canned prompt
    pub message: Option<String>,

    /// Continue an existing thread
    #[arg(short, long)]
    pub thread: Option<String>,
}
