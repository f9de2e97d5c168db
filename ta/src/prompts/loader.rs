//! Prompt rendering
//!
//! Registers the embedded templates once and renders them with typed
//! contexts.

use eyre::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use super::embedded;

/// Context for the trip planning prompt
#[derive(Debug, Clone, Serialize)]
pub struct PlanTripContext {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub preferences: String,
    pub budget: String,
}

/// Context for the destination recommendation prompt
#[derive(Debug, Clone, Serialize)]
pub struct RecommendContext {
    pub preferences: String,
    pub season: String,
    pub budget: String,
    pub duration: String,
}

/// Context for the travel tips prompt
#[derive(Debug, Clone, Serialize)]
pub struct TipsContext {
    pub destination: String,
    pub travel_style: String,
}

/// Context for the itinerary optimization prompt
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeContext {
    pub current_itinerary: String,
    pub feedback: String,
}

/// Context for the history recall prompt
#[derive(Debug, Clone, Serialize)]
pub struct RecallContext {
    pub digest: String,
}

/// Registered prompt templates
pub struct Prompts {
    registry: Handlebars<'static>,
}

impl Prompts {
    /// Register all embedded templates, failing fast on syntax errors
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        // Prompts are plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("plan-trip", embedded::PLAN_TRIP),
            ("recommend", embedded::RECOMMEND),
            ("tips", embedded::TIPS),
            ("optimize", embedded::OPTIMIZE),
            ("recall", embedded::RECALL),
        ] {
            registry
                .register_template_string(name, template)
                .context(format!("Failed to register template '{name}'"))?;
        }

        Ok(Self { registry })
    }

    pub fn plan_trip(&self, ctx: &PlanTripContext) -> Result<String> {
        self.render("plan-trip", ctx)
    }

    pub fn recommend(&self, ctx: &RecommendContext) -> Result<String> {
        self.render("recommend", ctx)
    }

    pub fn tips(&self, ctx: &TipsContext) -> Result<String> {
        self.render("tips", ctx)
    }

    pub fn optimize(&self, ctx: &OptimizeContext) -> Result<String> {
        self.render("optimize", ctx)
    }

    pub fn recall(&self, ctx: &RecallContext) -> Result<String> {
        self.render("recall", ctx)
    }

    fn render<T: Serialize>(&self, name: &str, ctx: &T) -> Result<String> {
        self.registry
            .render(name, ctx)
            .context(format!("Failed to render template '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_trip_renders_all_fields() {
        let prompts = Prompts::new().unwrap();
        let text = prompts
            .plan_trip(&PlanTripContext {
                destination: "Paris, France".into(),
                start_date: "2025-06-01".into(),
                end_date: "2025-06-07".into(),
                preferences: "museums & cafes".into(),
                budget: "moderate".into(),
            })
            .unwrap();

        assert!(text.contains("Paris, France"));
        assert!(text.contains("2025-06-01 to 2025-06-07"));
        assert!(text.contains("moderate"));
        // no HTML escaping of prompt text
        assert!(text.contains("museums & cafes"));
    }

    #[test]
    fn test_recall_embeds_digest() {
        let prompts = Prompts::new().unwrap();
        let text = prompts
            .recall(&RecallContext {
                digest: "### Past trips:\n- Kyoto".into(),
            })
            .unwrap();
        assert!(text.starts_with("### Past trips:\n- Kyoto"));
        assert!(text.contains("Travel pattern analysis"));
    }

    #[test]
    fn test_all_templates_register() {
        assert!(Prompts::new().is_ok());
    }
}
