//! Odds aggregation.
//!
//! Defines the `OddsProvider` trait, the per-league `OddsAggregator`
//! that walks the configured leagues, and the home-price extraction
//! that turns bookmaker quotes into a market-implied probability.

pub mod the_odds_api;

use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::types::{decimal_to_prob, Fetched, League, MatchEvent, SporexError};

/// Abstraction over odds sources.
///
/// One call fetches every upcoming event for a single league. A
/// non-success response is `Absent` (skip the league); `Fatal` stops the
/// remaining leagues for this run.
#[async_trait]
pub trait OddsProvider: Send + Sync {
    async fn fetch_league(&self, league: &League) -> Fetched<Vec<MatchEvent>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Fetches events for a fixed, ordered set of leagues.
pub struct OddsAggregator {
    /// `None` when no provider credential is configured.
    provider: Option<Box<dyn OddsProvider>>,
    leagues: Vec<League>,
    pause: Duration,
}

impl OddsAggregator {
    pub fn new(
        provider: Option<Box<dyn OddsProvider>>,
        leagues: Vec<League>,
        pause: Duration,
    ) -> Self {
        Self { provider, leagues, pause }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Fetch every league in order, stamping each event with its league.
    ///
    /// Sequential by design of the provider's rate limit; a fixed pause
    /// separates successive requests.
    pub async fn fetch(&self) -> Vec<MatchEvent> {
        let Some(provider) = self.provider.as_deref() else {
            let reason = SporexError::ConfigurationMissing("odds API key".to_string());
            info!(%reason, "Running without odds (no events)");
            return Vec::new();
        };

        let mut events = Vec::new();
        for (i, league) in self.leagues.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            match provider.fetch_league(league).await {
                Fetched::Present(batch) => {
                    info!(league = %league.name, count = batch.len(), "League odds fetched");
                    events.extend(batch.into_iter().map(|mut ev| {
                        ev.league = league.name.clone();
                        ev
                    }));
                }
                Fetched::Absent(reason) => {
                    warn!(league = %league.name, provider = provider.name(), reason = %reason, "Skipping league");
                }
                Fetched::Fatal(e) => {
                    error!(
                        league = %league.name,
                        provider = provider.name(),
                        error = %e,
                        "Odds provider unusable, skipping remaining leagues"
                    );
                    break;
                }
            }
        }

        info!(total = events.len(), leagues = self.leagues.len(), "Odds aggregation complete");
        events
    }
}

// ---------------------------------------------------------------------------
// Home price extraction
// ---------------------------------------------------------------------------

/// Average home-side decimal odd and the probability it implies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HomeOdds {
    pub avg_odd: Option<f64>,
    pub market_prob: Option<f64>,
}

/// Average every head-to-head quote for the home team. No matching quote
/// (or a nonsensical average) yields both fields `None`.
pub fn extract_home_odds(event: &MatchEvent) -> HomeOdds {
    let prices = event.bookmaker_prices();
    if prices.is_empty() {
        return HomeOdds::default();
    }
    let avg = prices.iter().sum::<f64>() / prices.len() as f64;
    match decimal_to_prob(avg) {
        Some(prob) => HomeOdds {
            avg_odd: Some(avg),
            market_prob: Some(prob.min(1.0)),
        },
        None => {
            warn!(event = %event, avg, "Non-positive average odd, treating as no price data");
            HomeOdds::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
