//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: route a single question
//! - chat: interactive multi-turn session
//! - classify: show the routing decision only
//! - tools / tool: list or invoke tools directly

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Routr - route questions to tools before asking the model
#[derive(Parser, Debug)]
#[command(name = "routr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route one question and print the answer
    Ask {
        /// Question text
        question: String,
    },

    /// Interactive session; type 'quit' to exit
    Chat,

    /// Show which route a question would take, without calling anything
    Classify {
        /// Question text
        question: String,
    },

    /// List available tools
    Tools,

    /// Invoke a tool directly
    Tool {
        /// Tool name (see `routr tools`)
        name: String,

        /// Query passed to the tool
        query: String,
    },
}
