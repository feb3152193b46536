//! CLI command definitions for todo-assist
//!
//! This module defines the CLI structure using clap's derive macros.
//! Running without a subcommand starts the HTTP server.

use crate::format::OutputFormat;
use crate::types::Filter;
use clap::{Parser, Subcommand};

/// Todo list with AI-assisted subtasks and priorities
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format for command results
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve(ServeArgs),

    /// List todos, newest first
    List {
        /// Which todos to show
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },

    /// Add a todo
    Add {
        /// Title of the todo
        title: String,
    },

    /// Flip a todo between active and completed
    Toggle { id: i64 },

    /// Change the title of a todo
    Rename { id: i64, title: String },

    /// Delete a todo
    Delete { id: i64 },

    /// Remove every completed todo
    ClearCompleted,

    /// Show total, active and completed counts
    Stats,

    /// Ask a running server for subtasks of a todo
    Suggest(SuggestArgs),

    /// Ask a running server to prioritise todos
    Prioritise(PrioritiseArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(clap::Args, Debug)]
pub struct SuggestArgs {
    /// Todo id or free-text title
    pub target: String,

    /// Base URL of the server (overrides config)
    #[arg(long)]
    pub server_url: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PrioritiseArgs {
    /// Titles to prioritise; defaults to all active todos
    pub titles: Vec<String>,

    /// Base URL of the server (overrides config)
    #[arg(long)]
    pub server_url: Option<String>,
}
