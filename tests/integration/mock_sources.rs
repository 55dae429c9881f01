//! In-memory sources and sinks for integration testing.
//!
//! Deterministic stand-ins for the odds API, the form scraper, the quote
//! service, and Telegram. Every fake records what it was asked so tests
//! can assert on call order and payloads.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sporex::data::{FormProvider, QuoteProvider};
use sporex::odds::OddsProvider;
use sporex::publish::{PublishOutcome, Publisher};
use sporex::types::{Fetched, League, MatchEvent, SporexError, TeamForm};

/// Build an event the way The Odds API returns it, with one h2h quote per
/// home price.
pub fn event(home: &str, away: &str, home_prices: &[f64]) -> MatchEvent {
    let bookmakers: Vec<_> = home_prices
        .iter()
        .map(|p| {
            json!({
                "key": "bookie",
                "markets": [{"key": "h2h", "outcomes": [
                    {"name": home, "price": p},
                    {"name": away, "price": 4.5},
                    {"name": "Draw", "price": 3.9}
                ]}]
            })
        })
        .collect();
    serde_json::from_value(json!({
        "id": format!("{home}-{away}"),
        "home_team": home,
        "away_team": away,
        "commence_time": "2026-10-24T14:00:00Z",
        "bookmakers": bookmakers
    }))
    .expect("valid event json")
}

pub fn form(wins: u32, rating: f64) -> TeamForm {
    TeamForm {
        last5_wins: Some(wins),
        avg_rating: Some(rating),
        ..TeamForm::default()
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

/// What a league request returns.
#[derive(Clone)]
pub enum LeagueScript {
    Events(Vec<MatchEvent>),
    /// Non-success HTTP status: the league is skipped.
    Outage(u16),
    /// Bad credentials: the provider gives up for the run.
    Unauthorized,
}

pub struct ScriptedOdds {
    scripts: HashMap<String, LeagueScript>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOdds {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn league(mut self, key: &str, script: LeagueScript) -> Self {
        self.scripts.insert(key.to_string(), script);
        self
    }

    /// Shared handle to the list of league keys requested so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requested)
    }
}

#[async_trait]
impl OddsProvider for ScriptedOdds {
    async fn fetch_league(&self, league: &League) -> Fetched<Vec<MatchEvent>> {
        self.requested.lock().unwrap().push(league.key.clone());
        match self.scripts.get(&league.key) {
            Some(LeagueScript::Events(events)) => Fetched::Present(events.clone()),
            Some(LeagueScript::Outage(status)) => Fetched::Absent(format!("HTTP {status}")),
            Some(LeagueScript::Unauthorized) => Fetched::Fatal(SporexError::SourceUnavailable {
                provider: "scripted".into(),
                message: "HTTP 401".into(),
            }),
            None => Fetched::Present(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Known teams return their form; unknown teams are `Absent`.
pub struct FixedForm {
    forms: HashMap<String, TeamForm>,
}

impl FixedForm {
    pub fn empty() -> Self {
        Self { forms: HashMap::new() }
    }

    pub fn with(mut self, team: &str, form: TeamForm) -> Self {
        self.forms.insert(team.to_string(), form);
        self
    }
}

#[async_trait]
impl FormProvider for FixedForm {
    async fn lookup(&self, team: &str) -> Fetched<TeamForm> {
        match self.forms.get(team) {
            Some(form) => Fetched::Present(form.clone()),
            None => Fetched::Absent(format!("no page for {team}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

pub struct FixedQuote(pub Option<String>);

#[async_trait]
impl QuoteProvider for FixedQuote {
    async fn random_quote(&self) -> Fetched<String> {
        match &self.0 {
            Some(q) => Fetched::Present(q.clone()),
            None => Fetched::Absent("quote service down".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

pub struct RecordingPublisher {
    configured: bool,
    fail_with: Option<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail_with: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unconfigured() -> Self {
        Self { configured: false, ..Self::new() }
    }

    /// Every publish reaches the endpoint and is rejected with `detail`.
    pub fn failing(detail: &str) -> Self {
        Self { fail_with: Some(detail.to_string()), ..Self::new() }
    }

    /// Shared handle to the texts sent so far.
    pub fn outbox(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn publish(&self, text: &str) -> PublishOutcome {
        if !self.configured {
            return PublishOutcome::not_configured();
        }
        self.sent.lock().unwrap().push(text.to_string());
        match &self.fail_with {
            Some(detail) => PublishOutcome::failed(detail.clone()),
            None => PublishOutcome::sent(r#"{"ok":true}"#),
        }
    }
}
