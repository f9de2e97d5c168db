//! Weather tools - the capability set exposed to itinerary and advisor agents

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::weather::WeatherClient;

use super::{Tool, ToolResult};

fn city_from(input: &Value) -> Result<&str, ToolResult> {
    match input["city"].as_str() {
        Some(city) if !city.trim().is_empty() => Ok(city),
        _ => Err(ToolResult::error("city is required")),
    }
}

fn country_from(input: &Value) -> Option<&str> {
    input["country"].as_str().filter(|c| !c.trim().is_empty())
}

fn city_schema(extra: Option<(&str, Value)>) -> Value {
    let mut properties = serde_json::json!({
        "city": {
            "type": "string",
            "description": "Name of the city"
        },
        "country": {
            "type": "string",
            "description": "Two-letter country code (optional)"
        }
    });
    if let Some((key, schema)) = extra {
        properties[key] = schema;
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": ["city"]
    })
}

/// Current conditions for a city
pub struct CurrentWeatherTool {
    client: Arc<WeatherClient>,
}

impl CurrentWeatherTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn name(&self) -> &'static str {
        "get_current_weather"
    }

    fn description(&self) -> &'static str {
        "Get current weather conditions for a city: temperature, condition, humidity, wind speed."
    }

    fn input_schema(&self) -> Value {
        city_schema(None)
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let city = match city_from(&input) {
            Ok(city) => city,
            Err(result) => return result,
        };
        match self.client.current(city, country_from(&input)).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => ToolResult::error(format!("Error getting weather data: {e}")),
        }
    }
}

/// Short-range forecast for a city
pub struct ForecastTool {
    client: Arc<WeatherClient>,
}

impl ForecastTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ForecastTool {
    fn name(&self) -> &'static str {
        "get_weather_forecast"
    }

    fn description(&self) -> &'static str {
        "Get a weather forecast for a city, grouped by date, up to 5 days ahead."
    }

    fn input_schema(&self) -> Value {
        city_schema(Some((
            "days",
            serde_json::json!({
                "type": "integer",
                "description": "Number of days (1-5, default 5)"
            }),
        )))
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let city = match city_from(&input) {
            Ok(city) => city,
            Err(result) => return result,
        };
        let days = input["days"].as_u64().unwrap_or(5) as u32;
        match self.client.forecast(city, days, country_from(&input)).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => ToolResult::error(format!("Error getting forecast data: {e}")),
        }
    }
}

/// Advisory weather alerts for a city
pub struct AlertsTool {
    client: Arc<WeatherClient>,
}

impl AlertsTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for AlertsTool {
    fn name(&self) -> &'static str {
        "get_weather_alerts"
    }

    fn description(&self) -> &'static str {
        "Get advisory weather alerts for a city derived from current conditions."
    }

    fn input_schema(&self) -> Value {
        city_schema(None)
    }

    async fn execute(&self, input: Value) -> ToolResult {
        let city = match city_from(&input) {
            Ok(city) => city,
            Err(result) => return result,
        };
        match self.client.alerts(city, country_from(&input)).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => ToolResult::error(format!("Error getting alerts: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_schema_marks_city_required() {
        let schema = city_schema(None);
        assert_eq!(schema["required"][0], "city");
        assert!(schema["properties"]["country"].is_object());
    }

    #[test]
    fn test_city_from_rejects_blank() {
        assert!(city_from(&serde_json::json!({ "city": "  " })).is_err());
        assert!(city_from(&serde_json::json!({})).is_err());
        assert_eq!(city_from(&serde_json::json!({ "city": "Paris" })).unwrap(), "Paris");
    }

    #[test]
    fn test_country_from_filters_blank() {
        assert_eq!(country_from(&serde_json::json!({ "country": "FR" })), Some("FR"));
        assert_eq!(country_from(&serde_json::json!({ "country": "" })), None);
        assert_eq!(country_from(&serde_json::json!({})), None);
    }
}
