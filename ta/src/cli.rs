//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TravelAgent - agent-driven travel planning console
#[derive(Parser)]
#[command(
    name = "travelagent",
    about = "Agent-driven travel planning from your terminal",
    version,
    after_help = "Logs are written to: ~/.local/share/travelagent/logs/travelagent.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Launch the interactive menu (default when no subcommand)
    Menu,

    /// Plan a trip in one shot
    Plan {
        /// Destination, e.g. "Paris, France"
        destination: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Interests to plan around
        #[arg(long, default_value = "")]
        preferences: String,

        /// Budget level (low/moderate/high)
        #[arg(long, default_value = "moderate")]
        budget: String,
    },

    /// Recommend destinations from stated preferences
    Recommend {
        /// What you enjoy (beaches, culture, nightlife...)
        preferences: String,

        /// Travel season
        #[arg(long, default_value = "any")]
        season: String,

        /// Budget level
        #[arg(long, default_value = "moderate")]
        budget: String,

        /// Trip duration
        #[arg(long, default_value = "7 days")]
        duration: String,
    },

    /// Practical tips for a destination
    Tips {
        /// Destination
        destination: String,

        /// Travel style (backpacking, luxury, family...)
        #[arg(long, default_value = "general")]
        style: String,
    },

    /// Rework an itinerary from feedback
    Optimize {
        /// Current itinerary text
        itinerary: String,

        /// What should change
        feedback: String,
    },

    /// Summarize stored travel history
    History,

    /// Chat with one agent
    Chat {
        /// Your message
        message: String,

        /// Agent role (itinerary/advisor/memory)
        #[arg(long, default_value = "advisor")]
        agent: String,
    },

    /// Current conditions, forecast, and alerts for a city
    Weather {
        /// City, optionally "City,CC"
        city: String,

        /// Forecast days (1-5)
        #[arg(long, default_value = "3")]
        days: u32,

        /// Also print a packing checklist for a trip of this many days
        #[arg(long)]
        packing: Option<u32>,
    },

    /// Search past trips by destination substring
    Search {
        /// Destination fragment, e.g. "par"
        query: String,
    },

    /// Show trip store statistics
    Stats,

    /// Check API keys and configuration
    Doctor,
}
