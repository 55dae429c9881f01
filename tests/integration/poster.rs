//! Content poster across several runs sharing one ledger.

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::PathBuf;

use sporex::config::ContentConfig;
use sporex::engine::{ContentPoster, PostOutcome};
use sporex::storage::load_used;

use crate::mock_sources::{FixedQuote, RecordingPublisher};

const SIGNATURE: &str = "\n\n🕘 19/10 08:00 UTC • #SPOREXZONE";

struct Files {
    config: ContentConfig,
}

impl Files {
    fn new(content: &str) -> Self {
        let dir = std::env::temp_dir();
        let content_file: PathBuf = dir.join(format!("sporex_it_content_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&content_file, content).unwrap();
        Self {
            config: ContentConfig {
                content_file,
                used_file: dir.join(format!("sporex_it_used_{}.json", uuid::Uuid::new_v4())),
                ..ContentConfig::default()
            },
        }
    }
}

impl Drop for Files {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.config.content_file);
        let _ = std::fs::remove_file(&self.config.used_file);
    }
}

fn morning() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
}

#[tokio::test]
async fn test_rotation_covers_pool_before_repeating() {
    let files = Files::new(r#"{"messages": ["Tip A", "Tip B", "Tip C"], "quote_chance": 0.0}"#);
    let publisher = RecordingPublisher::new();
    let outbox = publisher.outbox();
    let poster = ContentPoster::new(&files.config, Box::new(FixedQuote(None)), Box::new(publisher));
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..3 {
        let outcome = poster.post(&mut rng, morning()).await.unwrap();
        assert_eq!(outcome.exit_code(), 0);
    }
    let first_round: HashSet<String> = outbox
        .lock()
        .unwrap()
        .iter()
        .map(|t| t.trim_end_matches(SIGNATURE).to_string())
        .collect();
    assert_eq!(first_round.len(), 3);
    assert_eq!(load_used(&files.config.used_file).len(), 3);

    poster.post(&mut rng, morning()).await.unwrap();
    let used = load_used(&files.config.used_file);
    assert_eq!(used.len(), 1);
    let last = outbox.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last, format!("{}{SIGNATURE}", used[0]));
}

#[tokio::test]
async fn test_quote_is_posted_and_not_recorded() {
    let files = Files::new(r#"{"messages": ["Tip A"], "quote_chance": 1.0}"#);
    let publisher = RecordingPublisher::new();
    let outbox = publisher.outbox();
    let quote = "💬 «Discipline beats talent» — Unknown".to_string();
    let poster = ContentPoster::new(
        &files.config,
        Box::new(FixedQuote(Some(quote.clone()))),
        Box::new(publisher),
    );

    let outcome = poster.post(&mut StdRng::seed_from_u64(1), morning()).await.unwrap();
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outbox.lock().unwrap()[0], format!("{quote}{SIGNATURE}"));
    assert!(load_used(&files.config.used_file).is_empty());
}

#[tokio::test]
async fn test_failed_publish_still_consumes_message() {
    let files = Files::new(r#"{"messages": ["Tip A"], "quote_chance": 0.0}"#);
    let poster = ContentPoster::new(
        &files.config,
        Box::new(FixedQuote(None)),
        Box::new(RecordingPublisher::failing("HTTP 400: chat not found")),
    );

    let outcome = poster.post(&mut StdRng::seed_from_u64(1), morning()).await.unwrap();
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(load_used(&files.config.used_file), vec!["Tip A"]);
}

#[tokio::test]
async fn test_unconfigured_publisher_exits_two() {
    let files = Files::new(r#"{"messages": ["Tip A"], "quote_chance": 0.0}"#);
    let poster = ContentPoster::new(
        &files.config,
        Box::new(FixedQuote(None)),
        Box::new(RecordingPublisher::unconfigured()),
    );

    let outcome = poster.post(&mut StdRng::seed_from_u64(1), morning()).await.unwrap();
    assert!(matches!(&outcome, PostOutcome::Sent(o) if o.detail == "not configured"));
    assert_eq!(outcome.exit_code(), 2);
}

#[tokio::test]
async fn test_missing_content_file_exits_one() {
    let files = Files::new("");
    std::fs::remove_file(&files.config.content_file).unwrap();
    let poster = ContentPoster::new(
        &files.config,
        Box::new(FixedQuote(None)),
        Box::new(RecordingPublisher::new()),
    );

    let outcome = poster.post(&mut StdRng::seed_from_u64(1), morning()).await.unwrap();
    assert_eq!(outcome, PostOutcome::EmptyPool);
    assert_eq!(outcome.exit_code(), 1);
}
