//! TravelAgent configuration types and loading
//!
//! One `Config` is constructed at process start and passed into the
//! session; there are no ambient globals. Secrets never live in the
//! config file - API keys are resolved from environment variables, with
//! a `.env` file in the working directory honored as a fallback source.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main TravelAgent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that both required API keys resolve. Call this early in
    /// startup to fail fast with clear remediation text.
    pub fn validate(&self) -> Result<()> {
        if resolve_key(&self.llm.api_key_env).is_none() {
            return Err(eyre::eyre!(
                "Model API key not found. Set the {} environment variable \
                 (get a key from https://ai.google.dev/aistudio) or add it to .env",
                self.llm.api_key_env
            ));
        }
        if resolve_key(&self.weather.api_key_env).is_none() {
            return Err(eyre::eyre!(
                "Weather API key not found. Set the {} environment variable \
                 (get a key from https://openweathermap.org/api) or add it to .env",
                self.weather.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .travelagent.yml
        let local_config = PathBuf::from(".travelagent.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/travelagent/travelagent.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("travelagent").join("travelagent.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_tokens: 8192,
            temperature: 0.7,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the environment or a `.env` file
    pub fn get_api_key(&self) -> Result<String> {
        resolve_key(&self.api_key_env)
            .ok_or_else(|| eyre::eyre!("{} is not set in the environment or .env", self.api_key_env))
    }
}

/// Weather provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Measurement units passed to the provider
    pub units: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            units: "metric".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl WeatherConfig {
    /// Resolve the API key from the environment or a `.env` file
    pub fn get_api_key(&self) -> Result<String> {
        resolve_key(&self.api_key_env)
            .ok_or_else(|| eyre::eyre!("{} is not set in the environment or .env", self.api_key_env))
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite trip store database
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/travelagent on Linux)
        let db_path = dirs::data_dir()
            .map(|d| d.join("travelagent"))
            .unwrap_or_else(|| PathBuf::from(".travelagent"))
            .join("trips.db");

        Self { db_path }
    }
}

/// Look up a key in the process environment, falling back to `./.env`
fn resolve_key(name: &str) -> Option<String> {
    if let Ok(value) = std::env::var(name)
        && !value.trim().is_empty()
    {
        return Some(value);
    }
    read_env_file(Path::new(".env")).remove(name)
}

/// Parse a dotenv-style file into a key/value map
///
/// Supports `KEY=value` lines, `#` comments, and optional surrounding
/// quotes on values. Missing file yields an empty map.
fn read_env_file(path: &Path) -> HashMap<String, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        map.insert(key.trim().to_string(), value.to_string());
    }
    map
}

/// Outcome of one diagnostic check run by `ta doctor`
#[derive(Debug, Clone)]
pub struct KeyCheck {
    /// What was checked
    pub name: String,
    /// Whether the key resolved at all
    pub present: bool,
    /// Superficial format warning, if any (length/prefix heuristics,
    /// never cryptographic validation)
    pub warning: Option<String>,
}

/// Run superficial checks on both configured API keys
pub fn check_keys(config: &Config) -> Vec<KeyCheck> {
    let mut checks = Vec::new();

    let model_key = resolve_key(&config.llm.api_key_env);
    checks.push(KeyCheck {
        name: config.llm.api_key_env.clone(),
        present: model_key.is_some(),
        warning: model_key.as_deref().and_then(model_key_warning),
    });

    let weather_key = resolve_key(&config.weather.api_key_env);
    checks.push(KeyCheck {
        name: config.weather.api_key_env.clone(),
        present: weather_key.is_some(),
        warning: weather_key.as_deref().and_then(weather_key_warning),
    });

    checks
}

/// Gemini keys start with "AI" and run longer than 30 characters
fn model_key_warning(key: &str) -> Option<String> {
    if key.starts_with("AI") && key.len() > 30 {
        None
    } else {
        Some("key format may be incorrect (expected 'AI' prefix, length > 30)".to_string())
    }
}

/// OpenWeatherMap keys are exactly 32 characters
fn weather_key_warning(key: &str) -> Option<String> {
    if key.len() == 32 {
        None
    } else {
        Some("key format may be incorrect (expected 32 characters)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format_heuristics() {
        // Plausible keys pass silently
        assert!(model_key_warning("AIzaSyD-xxxxxxxxxxxxxxxxxxxxxxxxxxxxx").is_none());
        assert!(weather_key_warning("0123456789abcdef0123456789abcdef").is_none());

        // Wrong prefix, too short, wrong length all warn
        assert!(model_key_warning("sk-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx").is_some());
        assert!(model_key_warning("AIshort").is_some());
        assert!(weather_key_warning("tooshort").is_some());
        assert!(weather_key_warning(&"f".repeat(33)).is_some());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.weather.units, "metric");
        assert!(config.storage.db_path.ends_with("trips.db"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ta.yml");
        std::fs::write(
            &path,
            "llm:\n  model: gemini-1.5-pro\n  max-tokens: 1024\nweather:\n  timeout-ms: 5000\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.weather.timeout_ms, 5000);
        // untouched sections keep defaults
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_read_env_file_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# comment\nGEMINI_API_KEY=AIzaSyTest1234567890123456789012345\nOPENWEATHER_API_KEY=\"abcdef\"\n\nBROKEN LINE\n",
        )
        .unwrap();

        let map = read_env_file(&path);
        assert_eq!(
            map.get("GEMINI_API_KEY").map(String::as_str),
            Some("AIzaSyTest1234567890123456789012345")
        );
        assert_eq!(map.get("OPENWEATHER_API_KEY").map(String::as_str), Some("abcdef"));
        assert!(!map.contains_key("BROKEN LINE"));
    }

    #[test]
    fn test_read_env_file_missing() {
        assert!(read_env_file(Path::new("/nonexistent/.env")).is_empty());
    }
}
