//! TravelSession - the orchestrator behind every front-end surface
//!
//! Stateless request/response over the agent roster, the trip store, and
//! the weather client. Every operation follows the same shape: validate
//! input, render a prompt, dispatch to one agent role, persist the
//! exchange, return the model text.
//!
//! Persisting an exchange is best-effort (a store write failure is logged
//! and the answer still returned); store reads that feed output propagate
//! errors so callers can tell "empty" from "unreachable".

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;
use tripstore::{AgentKind, NewTrip, StoreError, TripStore, DEFAULT_CONVERSATION_LIMIT, DEFAULT_TRIP_LIMIT};

use crate::agents::AgentRoster;
use crate::knowledge;
use crate::llm::LlmError;
use crate::prompts::{OptimizeContext, PlanTripContext, Prompts, RecallContext, RecommendContext, TipsContext};
use crate::weather::{WeatherClient, WeatherError};

/// Errors surfaced by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The caller's input failed validation
    #[error("{0}")]
    Validation(String),

    /// The trip store could not serve a read
    #[error("Trip store error: {0}")]
    Store(#[from] StoreError),

    /// The model provider failed
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The weather provider failed
    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    /// A prompt template failed to register or render
    #[error("Prompt error: {0}")]
    Prompt(String),
}

/// One user's travel-planning session
pub struct TravelSession {
    roster: AgentRoster,
    store: TripStore,
    weather: Option<Arc<WeatherClient>>,
    prompts: Prompts,
    user_id: String,
}

impl TravelSession {
    /// Assemble a session; fails only if a prompt template is broken
    pub fn new(
        roster: AgentRoster,
        store: TripStore,
        weather: Option<Arc<WeatherClient>>,
        user_id: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let prompts = Prompts::new().map_err(|e| SessionError::Prompt(e.to_string()))?;
        Ok(Self {
            roster,
            store,
            weather,
            prompts,
            user_id: user_id.into(),
        })
    }

    /// Plan a full trip itinerary and record it
    pub async fn plan_trip(
        &self,
        destination: &str,
        start_date: &str,
        end_date: &str,
        preferences: &str,
        budget: &str,
    ) -> Result<String, SessionError> {
        require("Destination", destination)?;
        let start = parse_date("Start date", start_date)?;
        let end = parse_date("End date", end_date)?;
        if end <= start {
            return Err(SessionError::Validation(
                "End date must fall after the start date".to_string(),
            ));
        }

        let prompt = self
            .prompts
            .plan_trip(&PlanTripContext {
                destination: destination.to_string(),
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
                preferences: preferences.to_string(),
                budget: budget.to_string(),
            })
            .map_err(|e| SessionError::Prompt(e.to_string()))?;

        let itinerary = self.run(AgentKind::Itinerary, &prompt).await?;

        let trip = NewTrip {
            destination: destination.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            preferences: preferences.to_string(),
            budget: budget.to_string(),
            itinerary: itinerary.clone(),
        };
        if let Err(e) = self.store.append_trip(&self.user_id, trip) {
            warn!(error = %e, "Failed to save trip record");
        }
        self.record_exchange(AgentKind::Itinerary, &prompt, &itinerary);

        Ok(itinerary)
    }

    /// Suggest destinations from stated preferences, remembering them
    pub async fn recommend_destinations(
        &self,
        preferences: &str,
        season: &str,
        budget: &str,
        duration: &str,
    ) -> Result<String, SessionError> {
        require("Preferences", preferences)?;

        let fields = serde_json::json!({
            "preferences": preferences,
            "season": season,
            "budget": budget,
            "duration": duration,
        });
        if let Err(e) = self.store.upsert_preferences(&self.user_id, &fields) {
            warn!(error = %e, "Failed to save preferences");
        }

        let prompt = self
            .prompts
            .recommend(&RecommendContext {
                preferences: preferences.to_string(),
                season: season.to_string(),
                budget: budget.to_string(),
                duration: duration.to_string(),
            })
            .map_err(|e| SessionError::Prompt(e.to_string()))?;

        let answer = self.run(AgentKind::Advisor, &prompt).await?;
        self.record_exchange(AgentKind::Advisor, &prompt, &answer);
        Ok(answer)
    }

    /// Practical tips for a destination
    pub async fn travel_tips(&self, destination: &str, travel_style: &str) -> Result<String, SessionError> {
        require("Destination", destination)?;

        let prompt = self
            .prompts
            .tips(&TipsContext {
                destination: destination.to_string(),
                travel_style: travel_style.to_string(),
            })
            .map_err(|e| SessionError::Prompt(e.to_string()))?;

        let answer = self.run(AgentKind::Advisor, &prompt).await?;
        self.record_exchange(AgentKind::Advisor, &prompt, &answer);
        Ok(answer)
    }

    /// Rework an existing itinerary from user feedback
    pub async fn optimize_itinerary(&self, current_itinerary: &str, feedback: &str) -> Result<String, SessionError> {
        require("Current itinerary", current_itinerary)?;

        let prompt = self
            .prompts
            .optimize(&OptimizeContext {
                current_itinerary: current_itinerary.to_string(),
                feedback: feedback.to_string(),
            })
            .map_err(|e| SessionError::Prompt(e.to_string()))?;

        let answer = self.run(AgentKind::Itinerary, &prompt).await?;
        self.record_exchange(AgentKind::Itinerary, &prompt, &answer);
        Ok(answer)
    }

    /// Summarize what the store knows about this user
    ///
    /// Builds a textual digest of past trips, saved preferences, and the
    /// conversation count, then lets the memory agent narrate it.
    pub async fn recall_history(&self) -> Result<String, SessionError> {
        let digest = self.history_digest()?;

        let prompt = self
            .prompts
            .recall(&RecallContext { digest })
            .map_err(|e| SessionError::Prompt(e.to_string()))?;

        let answer = self.run(AgentKind::Memory, &prompt).await?;
        self.record_exchange(AgentKind::Memory, &prompt, &answer);
        Ok(answer)
    }

    /// Free-form chat with a named agent role
    ///
    /// An unrecognized role falls back to the advisor rather than failing:
    /// the menu accepts free text here.
    pub async fn chat(&self, message: &str, role: &str) -> Result<String, SessionError> {
        require("Message", message)?;

        let kind = role.parse::<AgentKind>().unwrap_or(AgentKind::Advisor);
        let answer = self.run(kind, message).await?;
        self.record_exchange(kind, message, &answer);
        Ok(answer)
    }

    /// Weather-aware packing checklist, no model call involved
    pub async fn packing_checklist(&self, destination: &str, duration_days: u32) -> Result<String, SessionError> {
        require("Destination", destination)?;
        let weather = self.weather_client()?;
        let conditions = weather.current(destination, None).await?;

        let mut out = format!("{conditions}\n\nPacking checklist ({duration_days} days):\n");
        for item in knowledge::packing_list(&conditions, duration_days) {
            let _ = writeln!(out, "  - {item}");
        }
        Ok(out)
    }

    /// Current conditions, forecast, and alerts for a city
    pub async fn weather_report(&self, city: &str, days: u32) -> Result<String, SessionError> {
        require("City", city)?;
        let weather = self.weather_client()?;

        let current = weather.current(city, None).await?;
        let forecast = weather.forecast(city, days, None).await?;
        let alerts = weather.alerts(city, None).await?;
        Ok(format!("{current}\n\n{forecast}\n{alerts}"))
    }

    /// Formatted store statistics, overall and for this user
    pub fn stats(&self) -> Result<String, SessionError> {
        let stats = self.store.stats()?;
        let mine = self.store.user_stats(&self.user_id)?;
        Ok(format!(
            "Database: {}\nUsers with preferences: {}\nTrips recorded: {}\nConversations: {}\nTables: {}\n\n\
             Your data ({}):\n  Trips: {}\n  Conversations: {}\n  Saved preferences: {}",
            stats.path,
            stats.total_users,
            stats.total_trips,
            stats.total_conversations,
            stats.collections.join(", "),
            self.user_id,
            mine.trips,
            mine.conversations,
            if mine.has_preferences { "yes" } else { "no" },
        ))
    }

    /// Formatted destination search across all users
    pub fn search_trips(&self, query: &str) -> Result<String, SessionError> {
        require("Search query", query)?;

        let trips = self.store.search_trips(query, DEFAULT_TRIP_LIMIT)?;
        if trips.is_empty() {
            return Ok(format!("No trips matching '{query}'."));
        }

        let mut out = format!("Found {} trip(s) matching '{query}':\n", trips.len());
        for trip in trips {
            let _ = writeln!(
                out,
                "- {} ({} to {}), budget {}",
                trip.destination, trip.start_date, trip.end_date, trip.budget
            );
        }
        Ok(out)
    }

    async fn run(&self, kind: AgentKind, prompt: &str) -> Result<String, SessionError> {
        let answer = self.roster.agent(kind).run(prompt).await?;
        Ok(answer)
    }

    fn weather_client(&self) -> Result<&WeatherClient, SessionError> {
        self.weather.as_deref().ok_or_else(|| {
            SessionError::Weather(WeatherError::Config(
                "Weather client is not configured (set OPENWEATHER_API_KEY)".to_string(),
            ))
        })
    }

    fn history_digest(&self) -> Result<String, SessionError> {
        let trips = self.store.list_trips(&self.user_id, DEFAULT_TRIP_LIMIT)?;
        let preferences = self.store.get_preferences(&self.user_id)?;
        let conversations = self
            .store
            .list_conversations(&self.user_id, None, DEFAULT_CONVERSATION_LIMIT)?;

        let mut digest = String::from("Past trips:\n");
        if trips.is_empty() {
            digest.push_str("- none recorded\n");
        } else {
            for trip in &trips {
                let _ = writeln!(
                    digest,
                    "- {} ({} to {}), budget {}, preferences: {}",
                    trip.destination, trip.start_date, trip.end_date, trip.budget, trip.preferences
                );
            }
        }

        match preferences {
            Some(fields) => {
                let _ = writeln!(digest, "Saved preferences: {fields}");
            }
            None => digest.push_str("Saved preferences: none recorded\n"),
        }
        let _ = write!(digest, "Conversations on file: {}", conversations.len());

        Ok(digest)
    }

    fn record_exchange(&self, kind: AgentKind, prompt: &str, response: &str) {
        if let Err(e) = self.store.append_conversation(&self.user_id, kind, prompt, response) {
            warn!(agent = %kind, error = %e, "Failed to save conversation");
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), SessionError> {
    if value.trim().is_empty() {
        return Err(SessionError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, SessionError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| SessionError::Validation(format!("{field} must be a YYYY-MM-DD date, got '{value}'")))
}
