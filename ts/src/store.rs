//! Core TripStore implementation

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;

/// Which agent a conversation belongs to
///
/// A closed set: dispatch and filtering match exhaustively on this enum
/// rather than comparing free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Day-by-day itinerary planning
    Itinerary,
    /// Destination recommendations and travel tips
    Advisor,
    /// Travel history and preference recall
    Memory,
}

impl AgentKind {
    /// Stable string tag used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Itinerary => "itinerary",
            Self::Advisor => "advisor",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "itinerary" => Ok(Self::Itinerary),
            "advisor" => Ok(Self::Advisor),
            "memory" => Ok(Self::Memory),
            other => Err(StoreError::UnknownAgent(other.to_string())),
        }
    }
}

/// Fields for a trip about to be recorded
#[derive(Debug, Clone, Default)]
pub struct NewTrip {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub preferences: String,
    pub budget: String,
    pub itinerary: String,
}

/// A stored trip, retrieved newest-first
#[derive(Debug, Clone, serde::Serialize)]
pub struct TripRecord {
    pub trip_id: String,
    pub user_id: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub preferences: String,
    pub budget: String,
    pub itinerary: String,
    pub created_at: DateTime<Utc>,
}

/// One prompt/response exchange with an agent
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConversationRecord {
    pub user_id: String,
    pub agent_type: AgentKind,
    pub conversation: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Row counts for a single user
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserStats {
    /// Trips recorded for this user
    pub trips: u64,
    /// Conversations recorded for this user
    pub conversations: u64,
    /// Whether the user has a saved preference document
    pub has_preferences: bool,
}

/// Row counts and connection information
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    /// Users with saved preferences
    pub total_users: u64,
    /// Trips across all users
    pub total_trips: u64,
    /// Conversations across all users and agents
    pub total_conversations: u64,
    /// Table names in the database
    pub collections: Vec<String>,
    /// Where the database lives
    pub path: String,
}

/// The travel history store
///
/// Owns a single SQLite connection. SQLite serializes concurrent writers
/// itself; there is no in-process shared mutable state.
pub struct TripStore {
    conn: Connection,
    path: PathBuf,
}

impl TripStore {
    /// Open or create a store at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        let store = Self { conn, path };
        store.init_schema()?;
        info!(path = %store.path.display(), "Opened trip store");
        Ok(store)
    }

    /// Open an in-memory store (for tests)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create tables and indexes if they don't exist
    ///
    /// Indexes exist for read performance only; no correctness depends
    /// on them.
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_preferences (
                user_id     TEXT PRIMARY KEY,
                preferences TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trip_history (
                trip_id     TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                destination TEXT NOT NULL,
                start_date  TEXT NOT NULL,
                end_date    TEXT NOT NULL,
                preferences TEXT NOT NULL,
                budget      TEXT NOT NULL,
                itinerary   TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trip_user ON trip_history (user_id);
            CREATE INDEX IF NOT EXISTS idx_trip_destination ON trip_history (destination);
            CREATE INDEX IF NOT EXISTS idx_trip_created ON trip_history (created_at);
            CREATE TABLE IF NOT EXISTS agent_memory (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id      TEXT NOT NULL,
                agent_type   TEXT NOT NULL,
                conversation TEXT NOT NULL,
                response     TEXT NOT NULL,
                timestamp    TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_memory_user ON agent_memory (user_id);
            CREATE INDEX IF NOT EXISTS idx_memory_agent ON agent_memory (agent_type);
            CREATE INDEX IF NOT EXISTS idx_memory_time ON agent_memory (timestamp);",
        )?;
        Ok(())
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save user travel preferences, replacing any existing record
    ///
    /// One row per user; the whole document is overwritten and both
    /// timestamps reset. No preference history is retained.
    pub fn upsert_preferences(&self, user_id: &str, fields: &serde_json::Value) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let doc = serde_json::to_string(fields)?;
        self.conn.execute(
            "INSERT INTO user_preferences (user_id, preferences, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (user_id) DO UPDATE SET
                 preferences = excluded.preferences,
                 created_at = excluded.created_at,
                 updated_at = excluded.updated_at",
            params![user_id, doc, now],
        )?;
        debug!(%user_id, "Saved user preferences");
        Ok(())
    }

    /// Get a user's saved preferences, if any
    pub fn get_preferences(&self, user_id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT preferences FROM user_preferences WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        match doc {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }

    /// Record a completed trip, returning its generated id
    ///
    /// Trip ids are UUID v7 so two trips saved in the same second for the
    /// same user never collide.
    pub fn append_trip(&self, user_id: &str, trip: NewTrip) -> Result<String, StoreError> {
        let trip_id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO trip_history
                 (trip_id, user_id, destination, start_date, end_date, preferences, budget, itinerary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                trip_id,
                user_id,
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.preferences,
                trip.budget,
                trip.itinerary,
                now
            ],
        )?;
        debug!(%user_id, %trip_id, destination = %trip.destination, "Saved trip");
        Ok(trip_id)
    }

    /// Get a user's trips, newest first
    pub fn list_trips(&self, user_id: &str, limit: usize) -> Result<Vec<TripRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT trip_id, user_id, destination, start_date, end_date, preferences, budget, itinerary, created_at
             FROM trip_history
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], row_to_trip)?;
        let trips = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(trips)
    }

    /// Record one prompt/response exchange with an agent
    pub fn append_conversation(
        &self,
        user_id: &str,
        agent: AgentKind,
        conversation: &str,
        response: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO agent_memory (user_id, agent_type, conversation, response, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, agent.as_str(), conversation, response, now],
        )?;
        debug!(%user_id, agent = %agent, "Saved conversation");
        Ok(())
    }

    /// Get a user's conversation log, newest first, optionally filtered by agent
    pub fn list_conversations(
        &self,
        user_id: &str,
        agent: Option<AgentKind>,
        limit: usize,
    ) -> Result<Vec<ConversationRecord>, StoreError> {
        let mut sql = String::from(
            "SELECT user_id, agent_type, conversation, response, timestamp
             FROM agent_memory
             WHERE user_id = ?1",
        );
        if agent.is_some() {
            sql.push_str(" AND agent_type = ?3");
        }
        sql.push_str(" ORDER BY timestamp DESC, id DESC LIMIT ?2");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match agent {
            Some(agent) => stmt.query_map(params![user_id, limit as i64, agent.as_str()], row_to_conversation)?,
            None => stmt.query_map(params![user_id, limit as i64], row_to_conversation)?,
        };
        let conversations = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(conversations)
    }

    /// Search all trips whose destination contains the query, case-insensitively
    pub fn search_trips(&self, query: &str, limit: usize) -> Result<Vec<TripRecord>, StoreError> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let mut stmt = self.conn.prepare(
            "SELECT trip_id, user_id, destination, start_date, end_date, preferences, budget, itinerary, created_at
             FROM trip_history
             WHERE lower(destination) LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], row_to_trip)?;
        let trips = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(trips)
    }

    /// Row counts per collection plus connection information
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let total_users = self.count("user_preferences")?;
        let total_trips = self.count("trip_history")?;
        let total_conversations = self.count("agent_memory")?;

        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")?;
        let collections = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StoreStats {
            total_users,
            total_trips,
            total_conversations,
            collections,
            path: self.path.display().to_string(),
        })
    }

    /// Row counts scoped to one user
    pub fn user_stats(&self, user_id: &str) -> Result<UserStats, StoreError> {
        let trips: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM trip_history WHERE user_id = ?1", [user_id], |row| {
                row.get(0)
            })?;
        let conversations: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM agent_memory WHERE user_id = ?1", [user_id], |row| {
                row.get(0)
            })?;
        let has_preferences = self.get_preferences(user_id)?.is_some();

        Ok(UserStats {
            trips: trips as u64,
            conversations: conversations as u64,
            has_preferences,
        })
    }

    fn count(&self, table: &str) -> Result<u64, StoreError> {
        // table names come from the fixed schema above, never from callers
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

fn row_to_trip(row: &rusqlite::Row<'_>) -> rusqlite::Result<TripRecord> {
    let created_at: String = row.get(8)?;
    Ok(TripRecord {
        trip_id: row.get(0)?,
        user_id: row.get(1)?,
        destination: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        preferences: row.get(5)?,
        budget: row.get(6)?,
        itinerary: row.get(7)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationRecord> {
    let agent: String = row.get(1)?;
    let timestamp: String = row.get(4)?;
    // A stored agent_type outside the enum is corruption, not a default
    let agent_type = AgentKind::from_str(&agent)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e)))?;
    Ok(ConversationRecord {
        user_id: row.get(0)?,
        agent_type,
        conversation: row.get(2)?,
        response: row.get(3)?,
        timestamp: parse_timestamp(&timestamp),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Escape LIKE metacharacters in a user-supplied search term
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TripStore {
        TripStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_append_then_list_trips_returns_latest_first() {
        let store = store();
        store
            .append_trip(
                "default_user",
                NewTrip {
                    destination: "Lisbon, Portugal".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let id = store
            .append_trip(
                "default_user",
                NewTrip {
                    destination: "Kyoto, Japan".into(),
                    start_date: "2025-06-01".into(),
                    end_date: "2025-06-07".into(),
                    preferences: "temples".into(),
                    budget: "moderate".into(),
                    itinerary: "Day 1: Fushimi Inari".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        let trips = store.list_trips("default_user", 1).unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].trip_id, id);
        assert_eq!(trips[0].destination, "Kyoto, Japan");
        assert_eq!(trips[0].end_date, "2025-06-07");
    }

    #[test]
    fn test_trip_ids_are_unique_within_a_second() {
        let store = store();
        let a = store.append_trip("u", NewTrip::default()).unwrap();
        let b = store.append_trip("u", NewTrip::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list_trips("u", 10).unwrap().len(), 2);
    }

    #[test]
    fn test_upsert_preferences_replaces_existing_row() {
        let store = store();
        store
            .upsert_preferences("default_user", &serde_json::json!({"budget": "luxury"}))
            .unwrap();
        store
            .upsert_preferences("default_user", &serde_json::json!({"budget": "moderate", "season": "spring"}))
            .unwrap();

        let prefs = store.get_preferences("default_user").unwrap().unwrap();
        assert_eq!(prefs["budget"], "moderate");
        assert_eq!(prefs["season"], "spring");
        assert_eq!(store.stats().unwrap().total_users, 1);
    }

    #[test]
    fn test_get_preferences_absent_user() {
        let store = store();
        assert!(store.get_preferences("nobody").unwrap().is_none());
    }

    #[test]
    fn test_search_trips_case_insensitive_substring() {
        let store = store();
        store
            .append_trip(
                "default_user",
                NewTrip {
                    destination: "Paris, France".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .append_trip(
                "default_user",
                NewTrip {
                    destination: "Oslo, Norway".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        let hits = store.search_trips("par", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].destination, "Paris, France");
        assert!(store.search_trips("berlin", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_escapes_like_metacharacters() {
        let store = store();
        store
            .append_trip(
                "u",
                NewTrip {
                    destination: "Nice, France".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.search_trips("%", 10).unwrap().is_empty());
        assert!(store.search_trips("_", 10).unwrap().is_empty());
    }

    #[test]
    fn test_conversations_filter_by_agent() {
        let store = store();
        store
            .append_conversation("u", AgentKind::Itinerary, "plan paris", "ok")
            .unwrap();
        store
            .append_conversation("u", AgentKind::Advisor, "where next", "bali")
            .unwrap();
        store
            .append_conversation("u", AgentKind::Advisor, "tips", "pack light")
            .unwrap();

        let all = store.list_conversations("u", None, 20).unwrap();
        assert_eq!(all.len(), 3);
        // newest first
        assert_eq!(all[0].conversation, "tips");

        let advisor = store.list_conversations("u", Some(AgentKind::Advisor), 20).unwrap();
        assert_eq!(advisor.len(), 2);
        assert!(advisor.iter().all(|c| c.agent_type == AgentKind::Advisor));
    }

    #[test]
    fn test_stats_counts_and_collections() {
        let store = store();
        store.append_trip("u", NewTrip::default()).unwrap();
        store
            .append_conversation("u", AgentKind::Memory, "recall", "nothing yet")
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_trips, 1);
        assert_eq!(stats.total_conversations, 1);
        for table in ["agent_memory", "trip_history", "user_preferences"] {
            assert!(stats.collections.iter().any(|c| c == table));
        }
    }

    #[test]
    fn test_list_conversations_surfaces_corrupt_agent_type() {
        let store = store();
        store
            .append_conversation("u", AgentKind::Advisor, "tips", "pack light")
            .unwrap();
        store
            .conn
            .execute("UPDATE agent_memory SET agent_type = 'pilot'", [])
            .unwrap();

        let err = store.list_conversations("u", None, 10).unwrap_err();
        assert!(err.to_string().contains("pilot"));
    }

    #[test]
    fn test_user_stats_scope_to_one_user() {
        let store = store();
        store.append_trip("u1", NewTrip::default()).unwrap();
        store.append_trip("u1", NewTrip::default()).unwrap();
        store.append_trip("u2", NewTrip::default()).unwrap();
        store
            .append_conversation("u1", AgentKind::Advisor, "tips", "pack light")
            .unwrap();
        store
            .upsert_preferences("u2", &serde_json::json!({ "season": "summer" }))
            .unwrap();

        let u1 = store.user_stats("u1").unwrap();
        assert_eq!(u1.trips, 2);
        assert_eq!(u1.conversations, 1);
        assert!(!u1.has_preferences);

        let u2 = store.user_stats("u2").unwrap();
        assert_eq!(u2.trips, 1);
        assert_eq!(u2.conversations, 0);
        assert!(u2.has_preferences);
    }

    #[test]
    fn test_agent_kind_round_trip() {
        for kind in [AgentKind::Itinerary, AgentKind::Advisor, AgentKind::Memory] {
            assert_eq!(AgentKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(AgentKind::from_str("pilot").is_err());
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trips.db");
        let store = TripStore::open(&path).unwrap();
        store.append_trip("u", NewTrip::default()).unwrap();
        assert!(path.exists());
    }
}
