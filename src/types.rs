//! Shared types for the SPOREX pipeline.
//!
//! These types form the data model used across all modules: the raw
//! fixtures coming out of the odds provider, the per-team form snapshot,
//! the derived feature vector, and the signals written to the run snapshot.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

/// A watched league: display name plus the odds provider's sport key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub key: String,
}

impl League {
    pub fn new(name: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
        }
    }

    /// The leagues watched when the config does not list any.
    pub fn defaults() -> Vec<League> {
        vec![
            League::new("Premier League", "soccer_epl"),
            League::new("LaLiga", "soccer_spain_la_liga"),
            League::new("Serie A", "soccer_italy_serie_a"),
            League::new("Bundesliga", "soccer_germany_bundesliga"),
            League::new("Ligue 1", "soccer_france_ligue_one"),
            League::new("Primeira Liga", "soccer_portugal_primeira_liga"),
            League::new("Eredivisie", "soccer_netherlands_eredivisie"),
        ]
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

// ---------------------------------------------------------------------------
// Match events (odds provider JSON → Rust)
// ---------------------------------------------------------------------------

/// One upcoming fixture as returned by the odds provider.
///
/// Only the team names are required. Everything below `bookmakers` is read
/// leniently: a malformed entry is skipped, so the match survives with
/// fewer (or no) prices.
///
/// `league` is not part of the provider payload; the aggregator stamps it
/// with the league the event was fetched for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub league: String,
    /// Kickoff as the provider's ISO-8601 string.
    #[serde(default, rename = "commence_time", deserialize_with = "lenient_text")]
    pub kickoff: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bookmaker {
    #[serde(default, deserialize_with = "lenient_text")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub markets: Vec<BookmakerMarket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmakerMarket {
    #[serde(default, deserialize_with = "lenient_text")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub outcomes: Vec<Outcome>,
}

/// A single quoted outcome. `price` is kept loosely typed: bookmakers
/// occasionally ship strings or nulls, which count as "no price".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub price: serde_json::Value,
}

/// A JSON array whose unreadable elements are dropped. Anything other
/// than an array (including `null`) reads as empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// A string field where any non-string value counts as missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

impl MatchEvent {
    /// Every decimal price quoted for the home side in the head-to-head
    /// market, in bookmaker order. Unparseable prices are dropped.
    pub fn bookmaker_prices(&self) -> Vec<f64> {
        let home = self.home_team.to_lowercase();
        self.bookmakers
            .iter()
            .flat_map(|b| b.markets.iter())
            .filter(|m| m.key == "h2h")
            .flat_map(|m| m.outcomes.iter())
            .filter(|o| {
                o.name
                    .as_deref()
                    .map(|n| !home.is_empty() && n.to_lowercase() == home)
                    .unwrap_or(false)
            })
            .filter_map(|o| parse_decimal_odd(&o.price))
            .collect()
    }
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {} [{}]", self.home_team, self.away_team, self.league)
    }
}

/// Read a decimal odd out of a loosely-typed JSON price.
pub fn parse_decimal_odd(value: &serde_json::Value) -> Option<f64> {
    let odd = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    odd.is_finite().then_some(odd)
}

/// Implied probability of a decimal odd. `None` for non-positive or
/// non-finite odds.
pub fn decimal_to_prob(odd: f64) -> Option<f64> {
    if odd.is_finite() && odd > 0.0 {
        Some(1.0 / odd)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Team form
// ---------------------------------------------------------------------------

pub const DEFAULT_LAST5_WINS: u32 = 2;
pub const DEFAULT_LAST5_DRAWS: u32 = 1;
pub const DEFAULT_LAST5_LOSSES: u32 = 2;
pub const DEFAULT_AVG_RATING: f64 = 7.0;

/// Best-effort recent-form snapshot for one team. Every field is optional;
/// callers read through the `*_or_default` accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    pub last5_wins: Option<u32>,
    pub last5_draws: Option<u32>,
    pub last5_losses: Option<u32>,
    pub avg_rating: Option<f64>,
    pub goals_for_last5: Option<u32>,
    pub goals_against_last5: Option<u32>,
}

impl TeamForm {
    pub fn wins_or_default(&self) -> u32 {
        self.last5_wins.unwrap_or(DEFAULT_LAST5_WINS)
    }

    pub fn draws_or_default(&self) -> u32 {
        self.last5_draws.unwrap_or(DEFAULT_LAST5_DRAWS)
    }

    pub fn losses_or_default(&self) -> u32 {
        self.last5_losses.unwrap_or(DEFAULT_LAST5_LOSSES)
    }

    pub fn rating_or_default(&self) -> f64 {
        self.avg_rating.unwrap_or(DEFAULT_AVG_RATING)
    }

    pub fn is_empty(&self) -> bool {
        *self == TeamForm::default()
    }
}

// ---------------------------------------------------------------------------
// Features, scores, signals
// ---------------------------------------------------------------------------

/// Model inputs for one match. Serialized into the snapshot as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub home_last5_wins: u32,
    pub away_last5_wins: u32,
    pub home_avg_rating: f64,
    pub away_avg_rating: f64,
    pub market_favorite_diff: f64,
}

/// A match after odds extraction and scoring, before filtering.
#[derive(Debug, Clone)]
pub struct ScoredMatch {
    pub event: MatchEvent,
    pub avg_odd: Option<f64>,
    pub market_prob: Option<f64>,
    pub features: FeatureVector,
    pub p_model: f64,
}

/// A match whose modeled probability cleared the publication threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub home: String,
    pub away: String,
    pub league: String,
    pub kickoff: String,
    pub kickoff_local: String,
    pub p_model: f64,
    pub avg_odd: Option<f64>,
    pub market_prob: Option<f64>,
    pub features: FeatureVector,
    pub factors: Vec<String>,
    pub short_analysis: String,
    pub prediction: String,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} [{}] p={:.1}% odd={}",
            self.home,
            self.away,
            self.league,
            self.p_model * 100.0,
            self.avg_odd
                .map(|o| format!("{o:.2}"))
                .unwrap_or_else(|| "N/A".to_string()),
        )
    }
}

/// The per-run output artifact, overwritten on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub generated_at: DateTime<Utc>,
    pub signals: Vec<Signal>,
}

impl RunSnapshot {
    pub fn empty() -> Self {
        Self {
            generated_at: Utc::now(),
            signals: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup outcomes
// ---------------------------------------------------------------------------

/// Result of a best-effort external lookup.
///
/// `Absent` means "degrade this data point to its default and carry on";
/// `Fatal` means the source cannot succeed for the rest of this run.
#[derive(Debug)]
pub enum Fetched<T> {
    Present(T),
    Absent(String),
    Fatal(SporexError),
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SPOREX.
#[derive(Debug, thiserror::Error)]
pub enum SporexError {
    #[error("Source unavailable ({provider}): {message}")]
    SourceUnavailable { provider: String, message: String },

    #[error("Parse failure ({what}): {message}")]
    ParseFailure { what: String, message: String },

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Publish failed: {0}")]
    PublishFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Cut `text` to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
