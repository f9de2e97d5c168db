//! TravelAgent - agent-driven travel planning console
//!
//! A thin orchestration layer over a hosted language model and a weather
//! API: three role-bound agents (itinerary planner, destination advisor,
//! memory manager) answer travel questions, with weather lookups exposed
//! to the model as callable tools and every exchange persisted to the
//! trip store.

pub mod agents;
pub mod cli;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;
pub mod tools;
pub mod weather;

/// The single hard-coded user identity
///
/// There is no authentication or multi-user isolation; every record in
/// the store is keyed by this identity.
pub const DEFAULT_USER: &str = "default_user";
