//! Command-line interface for strictly_mathle.

use clap::{Parser, Subcommand};

/// Strictly Mathle - the daily six-character equation puzzle
#[derive(Parser, Debug)]
#[command(name = "strictly_mathle")]
#[command(about = "Guess the daily equation in six tries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "strictly_mathle.toml")]
    pub config: std::path::PathBuf,

    /// Database file (overrides config and environment)
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show today's target, creating the puzzle if needed
    Today,

    /// Play today's puzzle interactively
    Play {
        /// User id for the leaderboard (anonymous if omitted)
        #[arg(long)]
        user_id: Option<String>,

        /// Display name for the leaderboard
        #[arg(long)]
        user_name: Option<String>,
    },

    /// Evaluate and validate an equation
    Check {
        /// The equation to check
        guess: String,

        /// Target value the equation must reach
        #[arg(short, long, allow_hyphen_values = true)]
        target: Option<f64>,
    },

    /// Generate random equations without storing them
    Generate {
        /// How many to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Rows to show (defaults to config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only today's puzzle instead of all-time averages
        #[arg(long)]
        today: bool,
    },

    /// Show a player's statistics
    Stats {
        /// User id to summarise
        #[arg(long)]
        user_id: String,
    },

    /// List recent puzzles
    Problems,
}
