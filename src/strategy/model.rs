//! Linear-logistic match model.
//!
//! `logit = a·Δwins + b·Δrating + c·market_favorite_diff + d`,
//! `p = sigmoid(logit)`. The coefficients are fixed; nothing is fitted.

use crate::types::{FeatureVector, TeamForm};

/// Market probability of a three-way default (home / draw / away).
pub const MARKET_BASELINE: f64 = 0.33;

/// Model coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Weight on home − away wins over the last five matches.
    pub form: f64,
    /// Weight on home − away average performance rating.
    pub rating: f64,
    /// Weight on market-implied probability above the baseline.
    pub market: f64,
    pub intercept: f64,
}

impl Coefficients {
    pub const FIXED: Coefficients = Coefficients {
        form: 0.45,
        rating: 0.25,
        market: 0.20,
        intercept: 0.05,
    };
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Logistic function, split on sign so `exp` never sees a large positive
/// argument.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Build the feature vector for one match. Absent form fields fall back
/// to the neutral defaults; absent odds give `-MARKET_BASELINE`.
pub fn build_features(home: &TeamForm, away: &TeamForm, market_prob: Option<f64>) -> FeatureVector {
    FeatureVector {
        home_last5_wins: home.wins_or_default(),
        away_last5_wins: away.wins_or_default(),
        home_avg_rating: home.rating_or_default(),
        away_avg_rating: away.rating_or_default(),
        market_favorite_diff: market_prob.unwrap_or(0.0) - MARKET_BASELINE,
    }
}

pub fn logit(features: &FeatureVector, k: &Coefficients) -> f64 {
    let win_delta = features.home_last5_wins as f64 - features.away_last5_wins as f64;
    let rating_delta = features.home_avg_rating - features.away_avg_rating;
    k.form * win_delta + k.rating * rating_delta + k.market * features.market_favorite_diff + k.intercept
}

/// Home-win probability under the fixed coefficients.
pub fn score(features: &FeatureVector) -> f64 {
    score_with(features, &Coefficients::FIXED)
}

pub fn score_with(features: &FeatureVector, k: &Coefficients) -> f64 {
    sigmoid(logit(features, k))
}
