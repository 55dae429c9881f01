//! The Odds API integration.
//!
//! API docs: https://the-odds-api.com/liveapi/guides/v4/
//! Endpoint: `GET /v4/sports/{sport_key}/odds`
//! Auth: `apiKey` query parameter. Every call consumes request credits,
//! so the aggregator spaces calls out and never retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

use super::OddsProvider;
use crate::config::OddsConfig;
use crate::types::{truncate_chars, Fetched, League, MatchEvent, SporexError};

const PROVIDER_NAME: &str = "the-odds-api";

/// Maximum characters of an error body kept for logs.
const ERROR_BODY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TheOddsApiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    regions: String,
    markets: String,
}

impl TheOddsApiClient {
    pub fn new(api_key: SecretString, config: &OddsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("SPOREX/0.1.0")
            .build()
            .context("Failed to build HTTP client for The Odds API")?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            regions: config.regions.clone(),
            markets: config.markets.clone(),
        })
    }

    fn odds_url(&self, sport_key: &str) -> String {
        format!("{}/sports/{}/odds", self.base_url, urlencoding::encode(sport_key))
    }
}

#[async_trait]
impl OddsProvider for TheOddsApiClient {
    async fn fetch_league(&self, league: &League) -> Fetched<Vec<MatchEvent>> {
        let url = self.odds_url(&league.key);
        debug!(url = %url, league = %league.name, "Fetching odds");

        let resp = match self
            .http
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.expose_secret().as_str()),
                ("regions", self.regions.as_str()),
                ("markets", self.markets.as_str()),
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            // The URL carries the API key in its query string.
            Err(e) => return Fetched::Absent(format!("request failed: {}", e.without_url())),
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body = truncate_chars(&body, ERROR_BODY_CHARS);
            if status == StatusCode::UNAUTHORIZED {
                return Fetched::Fatal(SporexError::SourceUnavailable {
                    provider: PROVIDER_NAME.to_string(),
                    message: format!("API key rejected ({status}): {body}"),
                });
            }
            return Fetched::Absent(format!("HTTP {status}: {body}"));
        }

        match resp.json::<Vec<serde_json::Value>>().await {
            Ok(raw) => Fetched::Present(parse_events(raw, &league.name)),
            Err(e) => Fetched::Absent(
                SporexError::ParseFailure {
                    what: format!("{} odds payload", league.name),
                    message: e.to_string(),
                }
                .to_string(),
            ),
        }
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

/// Convert raw provider events one by one so that a single malformed
/// event is dropped instead of failing the whole league.
pub fn parse_events(raw: Vec<serde_json::Value>, league: &str) -> Vec<MatchEvent> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<MatchEvent>(value) {
            Ok(mut ev) => {
                ev.league = league.to_string();
                Some(ev)
            }
            Err(e) => {
                warn!(league, index = i, error = %e, "Dropping malformed odds event");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
