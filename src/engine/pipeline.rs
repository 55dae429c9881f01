//! The digest pipeline: odds → form → score → filter → snapshot → publish.
//!
//! One pass per invocation. Every external call is awaited in sequence;
//! a failed data point degrades to its default and the run continues.

use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::compose::DigestComposer;
use crate::config::PipelineConfig;
use crate::data::FormProvider;
use crate::odds::OddsAggregator;
use crate::publish::{PublishOutcome, Publisher};
use crate::storage;
use crate::strategy::filter::SignalFilter;
use crate::strategy::score_event;
use crate::types::{Fetched, RunSnapshot, TeamForm};

/// Summary of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub events: usize,
    pub signals: usize,
    pub snapshot_path: PathBuf,
    /// `None` when the run stopped before composing (no events).
    pub publish: Option<PublishOutcome>,
}

pub struct DigestPipeline {
    odds: OddsAggregator,
    form: Box<dyn FormProvider>,
    publisher: Box<dyn Publisher>,
    filter: SignalFilter,
    composer: DigestComposer,
    output_file: PathBuf,
}

impl DigestPipeline {
    pub fn new(
        odds: OddsAggregator,
        form: Box<dyn FormProvider>,
        publisher: Box<dyn Publisher>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            odds,
            form,
            publisher,
            filter: SignalFilter::from_config(config),
            composer: DigestComposer::from_config(config),
            output_file: config.output_file.clone(),
        }
    }

    /// Run once. Errors only on snapshot write failure; every upstream
    /// problem has already been degraded or logged by the time it gets here.
    pub async fn run(&self) -> Result<RunReport> {
        info!(threshold = self.filter.threshold(), "Starting SPOREX pipeline");

        let events = self.odds.fetch().await;
        if events.is_empty() {
            storage::save_snapshot(&RunSnapshot::empty(), &self.output_file)?;
            info!("No events to analyse, empty snapshot written");
            return Ok(RunReport {
                events: 0,
                signals: 0,
                snapshot_path: self.output_file.clone(),
                publish: None,
            });
        }

        let total = events.len();
        let mut form_available = true;
        let mut scored = Vec::with_capacity(total);
        for event in events {
            let home = self.form_for(&event.home_team, &mut form_available).await;
            let away = self.form_for(&event.away_team, &mut form_available).await;
            scored.push(score_event(event, &home, &away));
        }

        let snapshot = RunSnapshot {
            generated_at: Utc::now(),
            signals: self.filter.apply(scored),
        };
        storage::save_snapshot(&snapshot, &self.output_file)?;
        for s in &snapshot.signals {
            info!(signal = %s, "Signal");
        }

        let message = self.composer.render(&snapshot.signals, snapshot.generated_at);
        let outcome = if self.publisher.is_configured() {
            let outcome = self.publisher.publish(&message).await;
            info!(success = outcome.success, detail = %outcome.detail, "Digest publish result");
            outcome
        } else {
            info!("Publisher not configured (token or chat missing), skipping send");
            PublishOutcome::not_configured()
        };

        info!(events = total, signals = snapshot.signals.len(), "Pipeline complete");
        Ok(RunReport {
            events: total,
            signals: snapshot.signals.len(),
            snapshot_path: self.output_file.clone(),
            publish: Some(outcome),
        })
    }

    /// Look up one team. After a fatal provider error the rest of the run
    /// uses neutral defaults without further requests.
    async fn form_for(&self, team: &str, available: &mut bool) -> TeamForm {
        if !*available {
            return TeamForm::default();
        }
        match self.form.lookup(team).await {
            Fetched::Present(form) => {
                if form.is_empty() {
                    debug!(team, "Form page carried no figures, using defaults");
                } else {
                    debug!(
                        team,
                        record = %format!(
                            "{}-{}-{}",
                            form.wins_or_default(),
                            form.draws_or_default(),
                            form.losses_or_default()
                        ),
                        rating = form.rating_or_default(),
                        "Form found"
                    );
                }
                form
            }
            Fetched::Absent(reason) => {
                debug!(team, %reason, "No form data, using defaults");
                TeamForm::default()
            }
            Fetched::Fatal(e) => {
                warn!(team, error = %e, "Form provider unusable, defaults for the rest of the run");
                *available = false;
                TeamForm::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
