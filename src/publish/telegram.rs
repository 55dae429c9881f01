//! Telegram Bot API publisher.
//!
//! Sends Markdown messages via `sendMessage`. Requires a bot token and a
//! destination chat; without either, `publish` short-circuits with
//! "not configured" and makes no request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{normalize_channel, PublishOutcome, Publisher};
use crate::config::TelegramConfig;
use crate::types::{truncate_chars, SporexError};

/// Maximum characters of the response body kept as outcome detail.
const DETAIL_CHARS: usize = 200;

/// Request body for sendMessage.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_web_page_preview: Option<bool>,
}

pub struct TelegramPublisher {
    http: Client,
    api_base: String,
    bot_token: Option<SecretString>,
    chat_id: Option<String>,
    disable_preview: bool,
}

impl TelegramPublisher {
    /// `chat` accepts a raw id, an `@handle`, or a `https://t.me/` link.
    pub fn new(
        bot_token: Option<SecretString>,
        chat: Option<&str>,
        config: &TelegramConfig,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.filter(|t| !t.expose_secret().trim().is_empty()),
            chat_id: normalize_channel(chat),
            disable_preview: false,
        })
    }

    /// Ask Telegram not to unfurl links in posted messages.
    pub fn without_link_previews(mut self) -> Self {
        self.disable_preview = true;
        self
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    fn request<'a>(&self, chat_id: &'a str, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: self.disable_preview.then_some(true),
        }
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    async fn publish(&self, text: &str) -> PublishOutcome {
        let (Some(token), Some(chat_id)) = (self.bot_token.as_ref(), self.chat_id.as_deref()) else {
            warn!("Telegram token or chat missing, not sending");
            return PublishOutcome::not_configured();
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token.expose_secret());
        let body = self.request(chat_id, text);

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                let status = resp.status();
                let detail = truncate_chars(&resp.text().await.unwrap_or_default(), DETAIL_CHARS);
                if status.is_success() {
                    info!(chat = chat_id, %status, "Telegram message sent");
                    PublishOutcome::sent(detail)
                } else {
                    let detail = format!("HTTP {status}: {detail}");
                    let err = SporexError::PublishFailure(detail.clone());
                    error!(chat = chat_id, error = %err, "Telegram API error");
                    PublishOutcome::failed(detail)
                }
            }
            Err(e) => {
                // reqwest errors can embed the URL, which carries the token.
                let e = e.without_url();
                error!(chat = chat_id, error = %e, "Telegram send failed");
                PublishOutcome::failed(e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
