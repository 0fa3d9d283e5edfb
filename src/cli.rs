use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Portion optimizer: solve for food quantities that hit macro targets.
#[derive(Parser, Debug)]
#[command(name = "portion-optimizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the shared food catalog (JSON array or CSV).
    #[arg(short, long, default_value = "food_data.json")]
    pub catalog: PathBuf,

    /// Optional user-specific food records that override catalog entries.
    #[arg(long)]
    pub user_foods: Option<PathBuf>,

    /// Optional optimizer configuration file (JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Body weight in kg; adds per-kg ratios to the totals.
    #[arg(short, long)]
    pub weight: Option<f64>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve a portion request read from a JSON file.
    Solve {
        /// Path to the request JSON.
        #[arg(short, long)]
        request: PathBuf,

        /// Print the JSON response instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Enter targets and foods interactively, then solve.
    Interactive,

    /// Search catalog codes.
    Search {
        /// Code fragment to look for.
        query: String,

        /// Maximum number of results.
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}
