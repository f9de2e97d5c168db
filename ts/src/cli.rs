//! CLI argument parsing for tripstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ts")]
#[command(author, version, about = "Travel history store maintenance", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(short, long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show row counts and collection names
    Stats,

    /// List a user's trips, newest first
    Trips {
        /// User to list trips for
        #[arg(short, long, default_value = "default_user")]
        user: String,

        /// Maximum trips to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Search trips by destination substring (case-insensitive)
    Search {
        /// Destination fragment to look for
        #[arg(required = true)]
        query: String,

        /// Maximum results to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List a user's agent conversations, newest first
    Conversations {
        /// User to list conversations for
        #[arg(short, long, default_value = "default_user")]
        user: String,

        /// Filter by agent type (itinerary, advisor, memory)
        #[arg(short, long)]
        agent: Option<String>,

        /// Maximum conversations to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a user's saved preferences
    Prefs {
        /// User to show preferences for
        #[arg(short, long, default_value = "default_user")]
        user: String,
    },
}
