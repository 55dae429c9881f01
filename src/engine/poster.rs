//! Rotation-mode content poster: one canned message (or quote) per run.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::path::PathBuf;
use tracing::{error, info};

use crate::compose::{format_post, Rotator, Selection};
use crate::config::ContentConfig;
use crate::data::QuoteProvider;
use crate::publish::{PublishOutcome, Publisher};
use crate::storage;

/// How a poster run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    EmptyPool,
    NothingChosen,
    Sent(PublishOutcome),
}

impl PostOutcome {
    /// Process exit status: 1 when there was nothing to post, 2 when the
    /// publish step failed, 0 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            PostOutcome::EmptyPool | PostOutcome::NothingChosen => 1,
            PostOutcome::Sent(outcome) if outcome.success => 0,
            PostOutcome::Sent(_) => 2,
        }
    }
}

pub struct ContentPoster {
    content_file: PathBuf,
    used_file: PathBuf,
    quotes: Box<dyn QuoteProvider>,
    publisher: Box<dyn Publisher>,
}

impl ContentPoster {
    pub fn new(config: &ContentConfig, quotes: Box<dyn QuoteProvider>, publisher: Box<dyn Publisher>) -> Self {
        Self {
            content_file: config.content_file.clone(),
            used_file: config.used_file.clone(),
            quotes,
            publisher,
        }
    }

    /// Choose, record, and send one message. The ledger is written before
    /// the send, so a failed send still consumes the message.
    pub async fn post<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) -> Result<PostOutcome> {
        let pool = storage::load_content(&self.content_file);
        if pool.messages.is_empty() {
            error!(path = %self.content_file.display(), "No messages found in content file");
            return Ok(PostOutcome::EmptyPool);
        }

        let rotator = Rotator::new(&pool, &self.used_file, self.quotes.as_ref());
        let Some(selection) = rotator.choose(rng).await? else {
            error!("No message chosen");
            return Ok(PostOutcome::NothingChosen);
        };
        if let Selection::Quote(_) = selection {
            info!("Posting external quote");
        }

        let text = format_post(selection.text(), now);
        let outcome = self.publisher.publish(&text).await;
        info!(success = outcome.success, detail = %outcome.detail, "Content post result");
        Ok(PostOutcome::Sent(outcome))
    }
}
