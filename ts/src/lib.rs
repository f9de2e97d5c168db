//! TripStore - persistent travel history and conversation store
//!
//! The persistence boundary for the travel agent: user preferences,
//! trip records, and per-agent conversation logs, backed by a single
//! SQLite database file.
//!
//! # Collections
//!
//! ```text
//! user_preferences   one row per user, replaced on every write
//! trip_history       append-only, newest-first retrieval
//! agent_memory       append-only conversation log, filterable by agent
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tripstore::{NewTrip, TripStore};
//!
//! let store = TripStore::open("trips.db")?;
//! let trip_id = store.append_trip("default_user", NewTrip {
//!     destination: "Paris, France".into(),
//!     ..Default::default()
//! })?;
//! let recent = store.list_trips("default_user", 10)?;
//! ```

pub mod cli;
pub mod config;
mod error;
mod store;

pub use error::StoreError;
pub use store::{AgentKind, ConversationRecord, NewTrip, StoreStats, TripRecord, TripStore, UserStats};

/// Default number of trips returned by history queries
pub const DEFAULT_TRIP_LIMIT: usize = 10;

/// Default number of conversations returned by memory queries
pub const DEFAULT_CONVERSATION_LIMIT: usize = 20;
