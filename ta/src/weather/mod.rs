//! Weather provider client
//!
//! Wraps the two OpenWeatherMap-shaped endpoints (current conditions,
//! short-range forecast) into formatted text blocks for the agents and
//! the quick-check menu. Failures are typed `WeatherError`s; the tool
//! layer decides how to render them for the model.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::WeatherConfig;

/// Provider cap on forecast samples (5 days of 3-hour slots)
const MAX_FORECAST_SAMPLES: u32 = 40;

/// Errors that can occur during weather lookups
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Weather provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A single three-hour forecast sample
#[derive(Debug, Clone)]
pub struct ForecastSample {
    /// Timestamp as `YYYY-MM-DD HH:MM:SS`
    pub dt_txt: String,
    pub temp: f64,
    pub description: String,
}

/// Weather API client
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    units: String,
    http: Client,
    timeout: Duration,
}

impl WeatherClient {
    /// Create a new client from configuration
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = config.get_api_key().map_err(|e| WeatherError::Config(e.to_string()))?;
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(WeatherError::Network)?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
            http,
            timeout,
        })
    }

    /// Get current conditions for a city as a formatted text block
    pub async fn current(&self, city: &str, country: Option<&str>) -> Result<String, WeatherError> {
        let conditions: CurrentConditions = self.get("weather", &location(city, country), &[]).await?;
        Ok(render_current(&conditions))
    }

    /// Get a short-range forecast, grouped by calendar date
    ///
    /// `days` outside 1-5 is clamped via the provider's 40-sample cap.
    pub async fn forecast(&self, city: &str, days: u32, country: Option<&str>) -> Result<String, WeatherError> {
        let cnt = sample_count(days);
        let response: ForecastResponse = self
            .get("forecast", &location(city, country), &[("cnt", cnt.to_string())])
            .await?;

        let samples: Vec<ForecastSample> = response
            .list
            .into_iter()
            .map(|item| ForecastSample {
                dt_txt: item.dt_txt,
                temp: item.main.temp,
                description: item.weather.first().map(|w| w.description.clone()).unwrap_or_default(),
            })
            .collect();
        Ok(render_forecast(&response.city.name, &response.city.country, &samples))
    }

    /// Derive advisory alerts from current conditions
    ///
    /// This is a keyword heuristic over the rendered current-weather
    /// text, not a dedicated alerts feed; it can both over- and
    /// under-trigger. Treat the output as advisory only.
    pub async fn alerts(&self, city: &str, country: Option<&str>) -> Result<String, WeatherError> {
        let current = self.current(city, country).await?;
        Ok(derive_alerts(city, &current))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &str,
        extra: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query: Vec<(&str, String)> = vec![
            ("q", location.to_string()),
            ("appid", self.api_key.clone()),
            ("units", self.units.clone()),
        ];
        query.extend(extra.iter().cloned());

        debug!(%endpoint, %location, "Weather lookup");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(WeatherError::Provider {
                status: status.as_u16(),
                message: extract_provider_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| WeatherError::InvalidResponse(format!("Failed to parse response: {e}")))
    }

    fn classify(&self, error: reqwest::Error) -> WeatherError {
        if error.is_timeout() {
            WeatherError::Timeout(self.timeout)
        } else {
            WeatherError::Network(error)
        }
    }
}

/// Samples to request for a day count; the model supplies `days`, so
/// clamp before multiplying
fn sample_count(days: u32) -> u32 {
    days.clamp(1, MAX_FORECAST_SAMPLES / 8) * 8
}

fn location(city: &str, country: Option<&str>) -> String {
    match country {
        Some(country) if !country.trim().is_empty() => format!("{city},{country}"),
        _ => city.to_string(),
    }
}

/// Wire format of the current-conditions endpoint (fields we consume)
#[derive(Debug, Deserialize)]
struct CurrentConditions {
    name: String,
    sys: Sys,
    main: MainFields,
    wind: Wind,
    weather: Vec<WeatherField>,
}

#[derive(Debug, Deserialize)]
struct Sys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct MainFields {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherField {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    city: ForecastCity,
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ForecastCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt_txt: String,
    main: ForecastMain,
    weather: Vec<WeatherField>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
}

/// Render current conditions in the fixed field order
fn render_current(conditions: &CurrentConditions) -> String {
    let description = conditions
        .weather
        .first()
        .map(|w| title_case(&w.description))
        .unwrap_or_default();
    format!(
        "Current Weather in {}, {}:\n\
         Temperature: {}°C (feels like {}°C)\n\
         Condition: {}\n\
         Humidity: {}%\n\
         Wind Speed: {} m/s",
        conditions.name,
        conditions.sys.country,
        conditions.main.temp,
        conditions.main.feels_like,
        description,
        conditions.main.humidity,
        conditions.wind.speed
    )
}

/// Render forecast samples grouped under one heading per calendar date
///
/// Headings appear in input order; samples with a malformed timestamp
/// are grouped under the raw prefix as-is.
pub fn render_forecast(city: &str, country: &str, samples: &[ForecastSample]) -> String {
    let mut out = format!("Weather Forecast for {city}, {country}:\n");
    let mut current_date: Option<&str> = None;

    for sample in samples {
        let date = sample.dt_txt.get(..10).unwrap_or(&sample.dt_txt);
        let time = sample.dt_txt.get(11..16).unwrap_or("");

        if current_date != Some(date) {
            out.push_str(&format!("\n{date}:\n"));
            current_date = Some(date);
        }
        out.push_str(&format!("  {time}: {}°C, {}\n", sample.temp, sample.description));
    }

    out
}

/// Keyword heuristic over rendered current-weather text
pub fn derive_alerts(city: &str, current_text: &str) -> String {
    let lower = current_text.to_lowercase();
    let mut alerts = Vec::new();

    if lower.contains("rain") || lower.contains("storm") {
        alerts.push("Rain/Storm Alert: Consider indoor activities");
    }
    if lower.contains("snow") {
        alerts.push("Snow Alert: Dress warmly and allow extra travel time");
    }
    if lower.contains("wind") && lower.contains("high") {
        alerts.push("High Wind Alert: Be cautious with outdoor activities");
    }

    if alerts.is_empty() {
        format!("No weather alerts for {city}. Conditions are favorable for travel!")
    } else {
        format!("Weather Alerts for {city}:\n{}", alerts.join("\n"))
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the provider's error message from a failed response body
fn extract_provider_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
