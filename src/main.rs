//! SPOREX: match analysis and Telegram publishing.
//!
//! Entry point. Loads `.env` and configuration, initialises structured
//! logging, wires the providers, and runs one subcommand to completion.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

use sporex::compose::render_test_message;
use sporex::config::{AppConfig, Secrets};
use sporex::dashboard::{self, DashboardState};
use sporex::data::quotes::QuotableClient;
use sporex::data::sofascore::SofaScoreClient;
use sporex::engine::{ContentPoster, DigestPipeline};
use sporex::odds::the_odds_api::TheOddsApiClient;
use sporex::odds::{OddsAggregator, OddsProvider};
use sporex::publish::telegram::TelegramPublisher;
use sporex::publish::Publisher;

#[derive(Parser, Debug)]
#[command(name = "sporex")]
#[command(author, version, about = "Football match analysis with a daily Telegram digest")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "SPOREX_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Run the analysis pipeline once and publish the digest (default).
    Analyze,
    /// Post one rotating canned message or quote.
    Post,
    /// Send a connectivity test message.
    TestMessage,
    /// Serve the latest snapshot over HTTP.
    Serve {
        /// Override `dashboard.port`.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let cfg = AppConfig::load(&cli.config)?;
    let secrets = cfg.secrets();

    match cli.command.unwrap_or(Command::Analyze) {
        Command::Analyze => analyze(&cfg, &secrets).await,
        Command::Post => post(&cfg, &secrets).await,
        Command::TestMessage => test_message(&cfg, &secrets).await,
        Command::Serve { port } => {
            let state = Arc::new(DashboardState::new(cfg.pipeline.output_file.clone()));
            dashboard::serve(state, port.unwrap_or(cfg.dashboard.port)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Digest pipeline. Degraded runs (no odds key, no publisher) still exit 0.
async fn analyze(cfg: &AppConfig, secrets: &Secrets) -> Result<ExitCode> {
    let provider: Option<Box<dyn OddsProvider>> = match secrets.odds_api_key.clone() {
        Some(key) => Some(Box::new(TheOddsApiClient::new(key, &cfg.odds)?)),
        None => {
            warn!(env = %cfg.odds.api_key_env, "No odds API key set");
            None
        }
    };
    let odds = OddsAggregator::new(provider, cfg.odds.leagues.clone(), cfg.odds.league_pause());

    let pipeline = DigestPipeline::new(
        odds,
        Box::new(SofaScoreClient::new(&cfg.form)?),
        Box::new(publisher(cfg, secrets)?),
        &cfg.pipeline,
    );
    let report = pipeline.run().await?;
    info!(
        events = report.events,
        signals = report.signals,
        snapshot = %report.snapshot_path.display(),
        "Wrote snapshot"
    );
    Ok(ExitCode::SUCCESS)
}

async fn post(cfg: &AppConfig, secrets: &Secrets) -> Result<ExitCode> {
    let poster = ContentPoster::new(
        &cfg.content,
        Box::new(QuotableClient::new(&cfg.content)?),
        Box::new(publisher(cfg, secrets)?.without_link_previews()),
    );
    let mut rng = StdRng::from_entropy();
    let outcome = poster.post(&mut rng, Utc::now()).await?;
    info!(outcome = ?outcome, "Content poster finished");
    Ok(ExitCode::from(outcome.exit_code()))
}

async fn test_message(cfg: &AppConfig, secrets: &Secrets) -> Result<ExitCode> {
    let publisher = publisher(cfg, secrets)?;
    let outcome = publisher.publish(&render_test_message(Utc::now())).await;
    info!(%outcome, "Test message result");
    Ok(ExitCode::SUCCESS)
}

fn publisher(cfg: &AppConfig, secrets: &Secrets) -> Result<TelegramPublisher> {
    TelegramPublisher::new(
        secrets.telegram_token.clone(),
        secrets.telegram_chat.as_deref(),
        &cfg.telegram,
    )
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sporex=info"));

    let json_logging = std::env::var("SPOREX_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
