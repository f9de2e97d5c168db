use std::str::FromStr;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use tripstore::cli::Cli;
use tripstore::config::Config;
use tripstore::{AgentKind, TripStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let db_path = cli.db.unwrap_or(config.db_path);

    info!("tripstore starting");

    let store = TripStore::open(&db_path)?;

    match cli.command {
        tripstore::cli::Command::Stats => {
            let stats = store.stats()?;
            println!("Database: {}", stats.path.cyan());
            println!("  Users: {}", stats.total_users);
            println!("  Trips: {}", stats.total_trips);
            println!("  Conversations: {}", stats.total_conversations);
            println!("  Collections: {}", stats.collections.join(", "));
        }
        tripstore::cli::Command::Trips { user, limit } => {
            let trips = store.list_trips(&user, limit)?;
            if trips.is_empty() {
                println!("No trips recorded for {user}");
            } else {
                for trip in trips {
                    println!(
                        "{} {} ({} to {}) budget={}",
                        trip.trip_id.yellow(),
                        trip.destination.cyan(),
                        trip.start_date,
                        trip.end_date,
                        trip.budget
                    );
                }
            }
        }
        tripstore::cli::Command::Search { query, limit } => {
            let trips = store.search_trips(&query, limit)?;
            if trips.is_empty() {
                println!("No trips matching '{query}'");
            } else {
                for trip in trips {
                    println!(
                        "{} {} ({} to {})",
                        trip.trip_id.yellow(),
                        trip.destination.cyan(),
                        trip.start_date,
                        trip.end_date
                    );
                }
            }
        }
        tripstore::cli::Command::Conversations { user, agent, limit } => {
            let agent = agent.map(|a| AgentKind::from_str(&a)).transpose()?;
            let conversations = store.list_conversations(&user, agent, limit)?;
            if conversations.is_empty() {
                println!("No conversations recorded for {user}");
            } else {
                for conv in conversations {
                    let preview: String = conv.conversation.chars().take(60).collect();
                    println!(
                        "[{}] {} {}",
                        conv.agent_type.to_string().green(),
                        conv.timestamp.to_rfc3339().dimmed(),
                        preview
                    );
                }
            }
        }
        tripstore::cli::Command::Prefs { user } => match store.get_preferences(&user)? {
            Some(prefs) => println!("{}", serde_json::to_string_pretty(&prefs)?),
            None => println!("No preferences saved for {user}"),
        },
    }

    Ok(())
}
