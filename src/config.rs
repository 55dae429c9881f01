//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section has documented defaults, so a missing file (or a missing key)
//! still yields a runnable configuration. Secrets (bot token, odds API key)
//! are referenced by env-var name in the config and resolved at startup.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::types::{League, SporexError};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub odds: OddsConfig,
    pub form: FormConfig,
    pub telegram: TelegramConfig,
    pub content: ContentConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Inclusive publication threshold on the modeled probability.
    pub min_probability: f64,
    pub output_file: PathBuf,
    /// Display timezone for kickoff times in the snapshot and digest.
    pub timezone_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_probability: 0.80,
            output_file: PathBuf::from("matches_today.json"),
            timezone_label: "Africa/Douala".to_string(),
        }
    }
}

impl PipelineConfig {
    /// IANA zone named by `timezone_label`; unknown labels fall back to UTC.
    pub fn display_timezone(&self) -> Tz {
        self.timezone_label.parse().unwrap_or(Tz::UTC)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsConfig {
    pub api_key_env: String,
    pub base_url: String,
    pub regions: String,
    pub markets: String,
    pub request_timeout_secs: u64,
    /// Pause between successive per-league requests.
    pub league_pause_ms: u64,
    pub leagues: Vec<League>,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            api_key_env: "THE_ODDS_API_KEY".to_string(),
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            regions: "eu,uk".to_string(),
            markets: "h2h".to_string(),
            request_timeout_secs: 20,
            league_pause_ms: 1000,
            leagues: League::defaults(),
        }
    }
}

impl OddsConfig {
    pub fn league_pause(&self) -> Duration {
        Duration::from_millis(self.league_pause_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FormConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sofascore.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token_env: String,
    pub chat_env: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_env: "TELEGRAM_CHAT".to_string(),
            api_base: "https://api.telegram.org".to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContentConfig {
    pub content_file: PathBuf,
    pub used_file: PathBuf,
    pub quote_url: String,
    pub quote_timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_file: PathBuf::from("backend/sporex_content.json"),
            used_file: PathBuf::from("backend/used_messages.json"),
            quote_url: "https://api.quotable.io/random".to_string(),
            quote_timeout_secs: 8,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Secrets resolved from the environment. Empty values count as absent.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub telegram_token: Option<SecretString>,
    pub telegram_chat: Option<String>,
    pub odds_api_key: Option<SecretString>,
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; an unreadable or malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        if !(0.0..=1.0).contains(&config.pipeline.min_probability) {
            return Err(SporexError::Config(format!(
                "pipeline.min_probability must be within [0, 1], got {}",
                config.pipeline.min_probability
            ))
            .into());
        }
        Ok(config)
    }

    /// Resolve the env vars named in the config.
    pub fn secrets(&self) -> Secrets {
        Secrets {
            telegram_token: Self::resolve_env(&self.telegram.bot_token_env).map(SecretString::new),
            telegram_chat: Self::resolve_env(&self.telegram.chat_env),
            odds_api_key: Self::resolve_env(&self.odds.api_key_env).map(SecretString::new),
        }
    }

    /// Read an environment variable, treating unset and blank alike.
    pub fn resolve_env(env_name: &str) -> Option<String> {
        std::env::var(env_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
