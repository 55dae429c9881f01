//! Signal filtering.
//!
//! Keeps scored matches at or above the publication threshold, in
//! provider order, and annotates each with factor tags, a one-line
//! rationale, and a textual prediction.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::types::{round_to, FeatureVector, ScoredMatch, Signal};

pub const FACTOR_HOME_FORM: &str = "home form advantage";
pub const FACTOR_RATING: &str = "higher average rating";
pub const FACTOR_MARKET: &str = "market favorite";
pub const FALLBACK_RATIONALE: &str = "marginal edge";

pub struct SignalFilter {
    threshold: f64,
    timezone: Tz,
}

impl SignalFilter {
    pub fn new(threshold: f64, timezone: Tz) -> Self {
        Self { threshold, timezone }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.min_probability, config.display_timezone())
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Inclusive: a match exactly at the threshold is kept.
    pub fn keeps(&self, p_model: f64) -> bool {
        p_model >= self.threshold
    }

    /// Filter and annotate. Order is preserved.
    pub fn apply(&self, scored: Vec<ScoredMatch>) -> Vec<Signal> {
        scored
            .into_iter()
            .filter(|m| {
                let keep = self.keeps(m.p_model);
                if !keep {
                    debug!(event = %m.event, p_model = m.p_model, "Below threshold");
                }
                keep
            })
            .map(|m| self.to_signal(m))
            .collect()
    }

    fn to_signal(&self, m: ScoredMatch) -> Signal {
        let factors = factors(&m.features, m.market_prob);
        let short_analysis = rationale(&factors);
        let kickoff_local = local_kickoff(&m.event.kickoff, self.timezone);
        let prediction = format!("Home win: {}", m.event.home_team);
        Signal {
            home: m.event.home_team,
            away: m.event.away_team,
            league: m.event.league,
            kickoff: m.event.kickoff,
            kickoff_local,
            p_model: round_to(m.p_model, 3),
            avg_odd: m.avg_odd.map(|o| round_to(o, 2)),
            market_prob: m.market_prob.map(|p| round_to(p, 3)),
            features: m.features,
            factors,
            short_analysis,
            prediction,
        }
    }
}

/// Factor tags explaining a kept match.
pub fn factors(features: &FeatureVector, market_prob: Option<f64>) -> Vec<String> {
    let mut tags = Vec::new();
    if features.home_last5_wins > features.away_last5_wins {
        tags.push(FACTOR_HOME_FORM.to_string());
    }
    if features.home_avg_rating > features.away_avg_rating {
        tags.push(FACTOR_RATING.to_string());
    }
    if market_prob.is_some_and(|p| p > 0.5) {
        tags.push(FACTOR_MARKET.to_string());
    }
    tags
}

pub fn rationale(factors: &[String]) -> String {
    if factors.is_empty() {
        FALLBACK_RATIONALE.to_string()
    } else {
        factors.join(" | ")
    }
}

/// Render a provider kickoff in the display timezone, DST included.
/// Unparseable timestamps are passed through untouched.
pub fn local_kickoff(kickoff: &str, timezone: Tz) -> String {
    match DateTime::parse_from_rfc3339(kickoff) {
        Ok(ts) => format!("{} {}", ts.with_timezone(&timezone).format("%Y-%m-%d %H:%M"), timezone.name()),
        Err(_) => kickoff.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
