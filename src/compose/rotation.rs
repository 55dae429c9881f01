//! Rotating selection from the canned-message pool.
//!
//! Every pool message is posted once before any repeats. The used-messages
//! ledger is rewritten immediately after each pool pick; when every message
//! has been used the ledger resets and the full pool becomes eligible again.

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::data::QuoteProvider;
use crate::storage::{load_used, save_used, ContentPool};
use crate::types::Fetched;

/// What the rotator picked for this post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A canned message, already recorded in the ledger.
    Pool(String),
    /// An external quote. Never recorded.
    Quote(String),
}

impl Selection {
    pub fn text(&self) -> &str {
        match self {
            Selection::Pool(s) | Selection::Quote(s) => s,
        }
    }
}

pub struct Rotator<'a> {
    pool: &'a ContentPool,
    ledger: &'a Path,
    quotes: &'a dyn QuoteProvider,
}

impl<'a> Rotator<'a> {
    pub fn new(pool: &'a ContentPool, ledger: &'a Path, quotes: &'a dyn QuoteProvider) -> Self {
        Self { pool, ledger, quotes }
    }

    /// Pick the next message. `Ok(None)` only when the pool is empty.
    ///
    /// With probability `quote_chance` an external quote is tried first; if
    /// it is unavailable the pool pick goes ahead as normal.
    pub async fn choose<R: Rng>(&self, rng: &mut R) -> Result<Option<Selection>> {
        if self.pool.messages.is_empty() {
            return Ok(None);
        }

        let mut used = load_used(self.ledger);
        let mut available: Vec<&String> = self
            .pool
            .messages
            .iter()
            .filter(|m| !used.contains(m))
            .collect();

        if available.is_empty() {
            info!(pool = self.pool.messages.len(), "All messages used, resetting rotation");
            used.clear();
            available = self.pool.messages.iter().collect();
        }

        if rng.gen::<f64>() < self.pool.quote_chance {
            match self.quotes.random_quote().await {
                Fetched::Present(quote) => {
                    debug!("Using external quote");
                    return Ok(Some(Selection::Quote(quote)));
                }
                Fetched::Absent(reason) => debug!(%reason, "No quote, falling back to pool"),
                Fetched::Fatal(e) => warn!(error = %e, "Quote source failed, falling back to pool"),
            }
        }

        let Some(choice) = available.choose(rng).map(|m| (*m).clone()) else {
            return Ok(None);
        };
        used.push(choice.clone());
        save_used(self.ledger, &used)?;
        debug!(used = used.len(), remaining = available.len() - 1, "Pool message chosen");
        Ok(Some(Selection::Pool(choice)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
