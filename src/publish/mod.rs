//! Outbound publishing.
//!
//! Defines the `Publisher` trait and channel-identifier normalization.
//! Publishing is single-shot: failures are reported in the outcome,
//! never retried and never raised.

pub mod telegram;

use async_trait::async_trait;
use std::fmt;

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub success: bool,
    /// Response body (truncated) or the reason no request was made.
    pub detail: String,
}

impl PublishOutcome {
    pub fn sent(detail: impl Into<String>) -> Self {
        Self { success: true, detail: detail.into() }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self { success: false, detail: detail.into() }
    }

    pub fn not_configured() -> Self {
        Self::failed(NOT_CONFIGURED)
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "sent" } else { "failed" };
        write!(f, "{status}: {}", self.detail)
    }
}

pub const NOT_CONFIGURED: &str = "not configured";

/// Abstraction over messaging endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Whether credentials and a destination are present.
    fn is_configured(&self) -> bool;

    /// Post `text` once.
    async fn publish(&self, text: &str) -> PublishOutcome;
}

const TELEGRAM_LINK_PREFIX: &str = "https://t.me/";

/// Canonicalize a destination channel.
///
/// `https://t.me/<name>` becomes `@<name>`; raw identifiers (numeric chat
/// ids, `@handles`) pass through trimmed; blank input is `None`.
pub fn normalize_channel(raw: Option<&str>) -> Option<String> {
    let chat = raw?.trim();
    if chat.is_empty() {
        return None;
    }
    match chat.strip_prefix(TELEGRAM_LINK_PREFIX) {
        Some(name) => {
            let name = name.trim().trim_start_matches('@').trim_end_matches('/');
            (!name.is_empty()).then(|| format!("@{name}"))
        }
        None => Some(chat.to_string()),
    }
}
