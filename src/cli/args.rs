//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Swipe-style emotion taxonomy navigator: classify a feeling, rate it, log it
#[derive(Parser, Debug)]
#[command(name = "feelflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// User id recorded with sessions (default: from config)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify and log an emotion interactively
    Log {
        /// Keep sessions in memory only
        #[arg(long)]
        dry_run: bool,
    },

    /// Show one month of sessions as a calendar
    History {
        /// Year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current)
        #[arg(long)]
        month: Option<u32>,
        /// Only list sessions of this day
        #[arg(long)]
        day: Option<u32>,
    },

    /// List the most recent sessions
    Recent {
        /// Maximum number of sessions (default: from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the emotion taxonomy as a tree
    Taxonomy {
        /// Validate and show this JSON taxonomy instead of the configured one
        #[arg(long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config and data file locations
    Path,
}
