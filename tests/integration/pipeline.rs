//! Digest pipeline end to end: odds → form → score → snapshot → publish.

use std::path::PathBuf;
use std::time::Duration;

use sporex::config::{PipelineConfig, TelegramConfig};
use sporex::engine::DigestPipeline;
use sporex::odds::{OddsAggregator, OddsProvider};
use sporex::publish::telegram::TelegramPublisher;
use sporex::publish::Publisher;
use sporex::storage::load_snapshot;
use sporex::types::League;

use crate::mock_sources::{event, form, FixedForm, LeagueScript, RecordingPublisher, ScriptedOdds};

fn snapshot_path() -> PathBuf {
    std::env::temp_dir().join(format!("sporex_it_{}.json", uuid::Uuid::new_v4()))
}

fn pipeline_config(path: &PathBuf) -> PipelineConfig {
    PipelineConfig {
        output_file: path.clone(),
        ..PipelineConfig::default()
    }
}

fn premier_league() -> Vec<League> {
    vec![League::new("Premier League", "soccer_epl")]
}

fn aggregator(provider: Option<Box<dyn OddsProvider>>, leagues: Vec<League>) -> OddsAggregator {
    OddsAggregator::new(provider, leagues, Duration::ZERO)
}

fn raw_snapshot(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_arsenal_with_default_form_is_not_a_signal() {
    let path = snapshot_path();
    let odds = ScriptedOdds::new().league(
        "soccer_epl",
        LeagueScript::Events(vec![event("Arsenal", "Newcastle", &[1.55])]),
    );
    let publisher = RecordingPublisher::new();
    let outbox = publisher.outbox();

    let pipeline = DigestPipeline::new(
        aggregator(Some(Box::new(odds)), premier_league()),
        Box::new(FixedForm::empty()),
        Box::new(publisher),
        &pipeline_config(&path),
    );
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.events, 1);
    assert_eq!(report.signals, 0);
    let snap = raw_snapshot(&path);
    assert!(snap["signals"].as_array().unwrap().is_empty());

    // Events existed, so the "nothing today" digest still goes out.
    let sent = outbox.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("No qualifying matches today"));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_strong_home_form_produces_one_signal() {
    let path = snapshot_path();
    let odds = ScriptedOdds::new().league(
        "soccer_epl",
        LeagueScript::Events(vec![event("Arsenal", "Newcastle", &[1.55])]),
    );
    let forms = FixedForm::empty()
        .with("Arsenal", form(5, 7.5))
        .with("Newcastle", form(0, 6.5));
    let publisher = RecordingPublisher::new();
    let outbox = publisher.outbox();

    let pipeline = DigestPipeline::new(
        aggregator(Some(Box::new(odds)), premier_league()),
        Box::new(forms),
        Box::new(publisher),
        &pipeline_config(&path),
    );
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.signals, 1);

    let snap = raw_snapshot(&path);
    let signals = snap["signals"].as_array().unwrap();
    assert_eq!(signals.len(), 1);
    let s = &signals[0];
    assert_eq!(s["home"], "Arsenal");
    assert_eq!(s["away"], "Newcastle");
    assert_eq!(s["league"], "Premier League");
    assert_eq!(s["avg_odd"], 1.55);
    assert_eq!(s["market_prob"], 0.645);
    assert_eq!(s["p_model"], 0.932);
    assert_eq!(s["features"]["home_last5_wins"], 5);
    assert_eq!(s["kickoff_local"], "2026-10-24 15:00 Africa/Douala");
    assert_eq!(
        s["factors"],
        serde_json::json!(["home form advantage", "higher average rating", "market favorite"])
    );
    assert_eq!(s["prediction"], "Home win: Arsenal");

    let sent = outbox.lock().unwrap();
    assert!(sent[0].contains("*Arsenal* _vs_ *Newcastle*"));
    assert!(sent[0].contains("93%"));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_no_odds_key_writes_empty_snapshot_and_sends_nothing() {
    let path = snapshot_path();
    let publisher = RecordingPublisher::new();
    let outbox = publisher.outbox();

    let pipeline = DigestPipeline::new(
        aggregator(None, League::defaults()),
        Box::new(FixedForm::empty()),
        Box::new(publisher),
        &pipeline_config(&path),
    );
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.events, 0);
    assert!(report.publish.is_none());
    let snap = load_snapshot(&path).unwrap().expect("snapshot written");
    assert!(snap.signals.is_empty());
    assert!(outbox.lock().unwrap().is_empty());

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_unconfigured_telegram_makes_no_request() {
    let path = snapshot_path();
    let odds = ScriptedOdds::new().league(
        "soccer_epl",
        LeagueScript::Events(vec![event("Arsenal", "Newcastle", &[1.55])]),
    );
    let telegram = TelegramPublisher::new(None, None, &TelegramConfig::default()).unwrap();
    assert!(!telegram.is_configured());

    let pipeline = DigestPipeline::new(
        aggregator(Some(Box::new(odds)), premier_league()),
        Box::new(FixedForm::empty()),
        Box::new(telegram),
        &pipeline_config(&path),
    );
    let report = pipeline.run().await.unwrap();

    let outcome = report.publish.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.detail, "not configured");
    assert!(path.exists());

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_league_outage_does_not_abort_the_run() {
    let path = snapshot_path();
    let odds = ScriptedOdds::new()
        .league("soccer_epl", LeagueScript::Events(vec![event("Arsenal", "Newcastle", &[1.55])]))
        .league("soccer_spain_la_liga", LeagueScript::Outage(503))
        .league(
            "soccer_italy_serie_a",
            LeagueScript::Events(vec![event("Inter", "Lecce", &[1.20, 1.30])]),
        );
    let requests = odds.requests();
    let forms = FixedForm::empty()
        .with("Inter", form(5, 7.6))
        .with("Lecce", form(0, 6.4));

    let pipeline = DigestPipeline::new(
        aggregator(Some(Box::new(odds)), League::defaults()),
        Box::new(forms),
        Box::new(RecordingPublisher::new()),
        &pipeline_config(&path),
    );
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.events, 2);
    assert_eq!(requests.lock().unwrap().len(), 7);

    let snap = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(snap.signals.len(), 1);
    assert_eq!(snap.signals[0].home, "Inter");
    assert_eq!(snap.signals[0].league, "Serie A");
    assert_eq!(snap.signals[0].avg_odd, Some(1.25));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_unauthorized_stops_remaining_leagues() {
    let path = snapshot_path();
    let odds = ScriptedOdds::new()
        .league("soccer_epl", LeagueScript::Events(vec![event("Arsenal", "Newcastle", &[1.55])]))
        .league("soccer_spain_la_liga", LeagueScript::Unauthorized);
    let requests = odds.requests();

    let pipeline = DigestPipeline::new(
        aggregator(Some(Box::new(odds)), League::defaults()),
        Box::new(FixedForm::empty()),
        Box::new(RecordingPublisher::new()),
        &pipeline_config(&path),
    );
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.events, 1);
    assert_eq!(
        *requests.lock().unwrap(),
        vec!["soccer_epl".to_string(), "soccer_spain_la_liga".to_string()]
    );

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_signal_order_follows_provider_order() {
    let path = snapshot_path();
    let odds = ScriptedOdds::new().league(
        "soccer_epl",
        LeagueScript::Events(vec![
            event("Liverpool", "Burnley", &[1.30]),
            event("Everton", "Fulham", &[2.60]),
            event("Chelsea", "Luton", &[1.25]),
        ]),
    );
    let forms = FixedForm::empty()
        .with("Liverpool", form(5, 7.4))
        .with("Burnley", form(0, 6.5))
        .with("Chelsea", form(5, 7.3))
        .with("Luton", form(0, 6.4));

    let pipeline = DigestPipeline::new(
        aggregator(Some(Box::new(odds)), premier_league()),
        Box::new(forms),
        Box::new(RecordingPublisher::new()),
        &pipeline_config(&path),
    );
    pipeline.run().await.unwrap();

    let homes: Vec<String> = load_snapshot(&path)
        .unwrap()
        .unwrap()
        .signals
        .into_iter()
        .map(|s| s.home)
        .collect();
    assert_eq!(homes, vec!["Liverpool", "Chelsea"]);

    std::fs::remove_file(&path).unwrap();
}
