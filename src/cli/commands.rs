//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "campusrag")]
#[command(about = "CampusRAG CLI for knowledge base search and the API server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the knowledge base
    Search {
        /// Query text
        query: String,
        /// Maximum number of result sections
        #[arg(short, long, default_value = "8")]
        limit: usize,
        /// Explicit category override (skips the classifier)
        #[arg(short, long)]
        category: Option<String>,
        /// Disable typo correction
        #[arg(long)]
        no_typo_correction: bool,
        /// Print raw JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },
    /// Show which category the classifier assigns to a query
    Classify {
        /// Query text
        query: String,
    },
    /// Start the API server
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS even if enabled in config
        #[arg(long)]
        no_cors: bool,
    },
    /// Show current configuration
    Config,
}
