//! TravelAgent - agent-driven travel planning console
//!
//! CLI entry point: one-shot subcommands plus the interactive menu.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{info, warn};

use travelagent::DEFAULT_USER;
use travelagent::agents::AgentRoster;
use travelagent::cli::{Cli, Command};
use travelagent::config::{Config, check_keys};
use travelagent::knowledge;
use travelagent::llm::create_client;
use travelagent::repl::ReplSession;
use travelagent::session::TravelSession;
use travelagent::weather::WeatherClient;
use tripstore::{DEFAULT_TRIP_LIMIT, TripStore};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("travelagent")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to log file, not stdout/stderr - the menu owns the terminal
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("travelagent.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "TravelAgent loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        Some(Command::Plan {
            destination,
            start,
            end,
            preferences,
            budget,
        }) => {
            let session = build_session(&config)?;
            print_answer(session.plan_trip(&destination, &start, &end, &preferences, &budget).await)
        }
        Some(Command::Recommend {
            preferences,
            season,
            budget,
            duration,
        }) => {
            let session = build_session(&config)?;
            print_answer(
                session
                    .recommend_destinations(&preferences, &season, &budget, &duration)
                    .await,
            )
        }
        Some(Command::Tips { destination, style }) => {
            let session = build_session(&config)?;
            print_answer(session.travel_tips(&destination, &style).await)
        }
        Some(Command::Optimize { itinerary, feedback }) => {
            let session = build_session(&config)?;
            print_answer(session.optimize_itinerary(&itinerary, &feedback).await)
        }
        Some(Command::History) => {
            let session = build_session(&config)?;
            print_answer(session.recall_history().await)
        }
        Some(Command::Chat { message, agent }) => {
            let session = build_session(&config)?;
            print_answer(session.chat(&message, &agent).await)
        }
        Some(Command::Weather { city, days, packing }) => cmd_weather(&config, &city, days, packing).await,
        Some(Command::Search { query }) => cmd_search(&config, &query),
        Some(Command::Stats) => cmd_stats(&config),
        Some(Command::Doctor) => cmd_doctor(&config),
        Some(Command::Menu) | None => cmd_menu(&config).await,
    }
}

/// Build the full session: model client, weather client, trip store
fn build_session(config: &Config) -> Result<TravelSession> {
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let weather = Arc::new(WeatherClient::from_config(&config.weather).context("Failed to create weather client")?);
    let store = TripStore::open(&config.storage.db_path)
        .context(format!("Failed to open trip store at {}", config.storage.db_path.display()))?;

    let roster = AgentRoster::new(llm, Some(weather.clone()), &config.llm);
    let session = TravelSession::new(roster, store, Some(weather), DEFAULT_USER)
        .map_err(|e| eyre::eyre!("Failed to build session: {}", e))?;
    Ok(session)
}

fn print_answer(result: Result<String, travelagent::session::SessionError>) -> Result<()> {
    let text = result.map_err(|e| eyre::eyre!("{}", e))?;
    println!("{}", text);
    Ok(())
}

/// Run the interactive menu
async fn cmd_menu(config: &Config) -> Result<()> {
    let session = build_session(config)?;
    let mut repl = ReplSession::new(session);
    repl.run().await
}

/// Weather lookup without the model in the loop
async fn cmd_weather(config: &Config, city: &str, days: u32, packing: Option<u32>) -> Result<()> {
    let weather = WeatherClient::from_config(&config.weather)?;

    let current = weather.current(city, None).await?;
    let forecast = weather.forecast(city, days, None).await?;
    let alerts = weather.alerts(city, None).await?;
    println!("{current}\n\n{forecast}\n{alerts}");

    if let Some(duration) = packing {
        println!("\nPacking checklist ({duration} days):");
        for item in knowledge::packing_list(&current, duration) {
            println!("  - {item}");
        }
    }
    Ok(())
}

/// Search stored trips directly, no API keys needed
fn cmd_search(config: &Config, query: &str) -> Result<()> {
    let store = TripStore::open(&config.storage.db_path)?;
    let trips = store.search_trips(query, DEFAULT_TRIP_LIMIT)?;

    if trips.is_empty() {
        println!("No trips matching '{}'.", query);
        return Ok(());
    }

    println!("{}", format!("Found {} trip(s) matching '{}':", trips.len(), query).bold());
    for trip in trips {
        println!(
            "  {} ({} to {}), budget {}",
            trip.destination.cyan(),
            trip.start_date,
            trip.end_date,
            trip.budget
        );
    }
    Ok(())
}

/// Show trip store statistics, no API keys needed
fn cmd_stats(config: &Config) -> Result<()> {
    let store = TripStore::open(&config.storage.db_path)?;
    let stats = store.stats()?;

    println!("{}", "Trip store".bold());
    println!("  Database:       {}", stats.path);
    println!("  Users:          {}", stats.total_users);
    println!("  Trips:          {}", stats.total_trips);
    println!("  Conversations:  {}", stats.total_conversations);
    println!("  Tables:         {}", stats.collections.join(", "));
    Ok(())
}

/// Environment diagnostics: key presence and superficial format checks
fn cmd_doctor(config: &Config) -> Result<()> {
    println!("{}", "Environment checks".bold());

    let mut all_present = true;
    for check in check_keys(config) {
        if check.present {
            match check.warning {
                Some(warning) => {
                    println!("  {} {} - {}", "~".yellow(), check.name, warning);
                    warn!(key = %check.name, warning = %warning, "Key format check failed");
                }
                None => println!("  {} {}", "✓".green(), check.name),
            }
        } else {
            all_present = false;
            println!("  {} {} is not set", "✗".red(), check.name);
        }
    }

    println!(
        "  {} database path: {}",
        if config.storage.db_path.exists() { "✓".green() } else { "~".yellow() },
        config.storage.db_path.display()
    );

    if !all_present {
        println!();
        println!("Set missing keys in the environment or a .env file:");
        println!("  {} - https://ai.google.dev/aistudio", config.llm.api_key_env);
        println!("  {} - https://openweathermap.org/api", config.weather.api_key_env);
    }
    Ok(())
}
