// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to settings file (optional)
    #[arg(short, long, value_name = "SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Vault root that deck and tag paths are relative to
    /// (default: nearest folder containing `.obsidian`)
    #[arg(long, value_name = "VAULT", global = true)]
    pub vault: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (plan, render or init)
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show what a sync would do in Anki for each note
    Plan {
        /// Markdown file or vault directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// AnkiConnect notesInfo response to compare against.
        /// Without it, notes that carry an id are planned as recreations.
        #[arg(short, long, value_name = "FILE")]
        remote: Option<PathBuf>,

        /// Tag index as JSON (path to tag list); built from the documents if omitted
        #[arg(short, long, value_name = "FILE")]
        tags: Option<PathBuf>,

        /// Output the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite note blocks into their canonical form
    Render {
        /// Markdown file or vault directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Write the changes instead of listing them
        #[arg(short, long)]
        write: bool,
    },

    /// Create a settings file with default values
    Init,
}
