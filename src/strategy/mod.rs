//! Strategy: feature building, the probability model, and signal filtering.

pub mod filter;
pub mod model;

use tracing::debug;

use crate::odds::extract_home_odds;
use crate::types::{MatchEvent, ScoredMatch, TeamForm};

/// Extract odds, build features, and score one match.
///
/// Infallible: missing odds or form data degrade to their defaults, so a
/// single bad event never aborts the batch.
pub fn score_event(event: MatchEvent, home: &TeamForm, away: &TeamForm) -> ScoredMatch {
    let odds = extract_home_odds(&event);
    let features = model::build_features(home, away, odds.market_prob);
    let p_model = model::score(&features);

    debug!(
        event = %event,
        avg_odd = ?odds.avg_odd,
        market_prob = ?odds.market_prob,
        p_model = %format!("{:.3}", p_model),
        "Match scored"
    );

    ScoredMatch {
        event,
        avg_odd: odds.avg_odd,
        market_prob: odds.market_prob,
        features,
        p_model,
    }
}
