//! Prompt templates and rendering

pub mod embedded;
mod loader;

pub use loader::{OptimizeContext, PlanTripContext, Prompts, RecallContext, RecommendContext, TipsContext};
