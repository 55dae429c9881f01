//! Quotable random-quote provider.
//!
//! API: `GET https://api.quotable.io/random` → `{ "content", "author", ... }`
//! No auth. Used by the content poster as an occasional substitute for a
//! canned message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::QuoteProvider;
use crate::config::ContentConfig;
use crate::types::Fetched;

#[derive(Debug, Deserialize)]
struct QuotableResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

pub struct QuotableClient {
    http: Client,
    url: String,
}

impl QuotableClient {
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.quote_timeout_secs))
            .user_agent("SPOREX/0.1.0")
            .build()
            .context("Failed to build quote HTTP client")?;
        Ok(Self {
            http,
            url: config.quote_url.clone(),
        })
    }
}

#[async_trait]
impl QuoteProvider for QuotableClient {
    async fn random_quote(&self) -> Fetched<String> {
        let resp = match self.http.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) => return Fetched::Absent(format!("quote request failed: {e}")),
        };
        if !resp.status().is_success() {
            return Fetched::Absent(format!("quote API returned {}", resp.status()));
        }
        match resp.json::<QuotableResponse>().await {
            Ok(q) => match format_quote(q.content.as_deref(), q.author.as_deref()) {
                Some(text) => Fetched::Present(text),
                None => Fetched::Absent("quote without content".to_string()),
            },
            Err(e) => Fetched::Absent(format!("unparseable quote: {e}")),
        }
    }
}

/// Render a quote for posting. Blank content means no quote.
pub fn format_quote(content: Option<&str>, author: Option<&str>) -> Option<String> {
    let content = content.map(str::trim).filter(|c| !c.is_empty())?;
    let author = author.map(str::trim).filter(|a| !a.is_empty()).unwrap_or("Unknown");
    Some(format!("💬 «{content}» — {author}"))
}
