use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{OrderCommands, SitrepCommands, TaskCommands, UserCommands};

/// Versioned order tracking from the command line
///
/// Orders carry a primary task, delegated tasks and situation reports. Every
/// change writes a new version of the order, and earlier versions stay
/// readable. The same operations are available to AI assistants through the
/// MCP server (`orderly serve`).
#[derive(Parser)]
#[command(version, about, name = "orderly")]
pub struct Args {
    /// Path to the state file. Defaults to $XDG_DATA_HOME/orderly/state.json
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Orderly CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage orders
    #[command(alias = "o")]
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Manage the delegated tasks of an order
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage the situation reports of an order
    #[command(alias = "s")]
    Sitrep {
        #[command(subcommand)]
        command: SitrepCommands,
    },
    /// Manage users
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Start the MCP server
    Serve,
}
