//! External data providers.
//!
//! Defines the `FormProvider` trait (recent team form) and the
//! `QuoteProvider` trait (external quotes for the content poster).
//! Both are best-effort: failures surface as `Fetched::Absent` and the
//! caller degrades to defaults.

pub mod quotes;
pub mod sofascore;

use async_trait::async_trait;

use crate::types::{Fetched, TeamForm};

/// Abstraction over recent-form sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormProvider: Send + Sync {
    /// Look up recent form for a team by display name. Never errors:
    /// network, parse, or structural failures are `Absent`.
    async fn lookup(&self, team: &str) -> Fetched<TeamForm>;
}

/// Abstraction over external quote sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch one formatted quote, ready to post.
    async fn random_quote(&self) -> Fetched<String>;
}
