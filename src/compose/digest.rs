//! Digest rendering (Telegram Markdown).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::PipelineConfig;
use crate::types::Signal;

const HEADER: &str = "📊⚽ *SPOREX ZONE ANALYTICS: TODAY'S PREDICTIONS* 🇪🇺🔥";
const FOOTER: &str = "📲 Join SPOREX ZONE for the full debrief!\n#SPOREXZONE #Football #Predictions";

/// Renders the single digest document for one run.
pub struct DigestComposer {
    threshold: f64,
    timezone: Tz,
}

impl DigestComposer {
    pub fn new(threshold: f64, timezone: Tz) -> Self {
        Self { threshold, timezone }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.min_probability, config.display_timezone())
    }

    fn stamp(&self, at: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            at.with_timezone(&self.timezone).format("%Y-%m-%d %H:%M"),
            self.timezone.name()
        )
    }

    /// Always returns a message; zero signals renders an explicit
    /// "nothing qualified" document.
    pub fn render(&self, signals: &[Signal], generated_at: DateTime<Utc>) -> String {
        let mut msg = String::new();
        msg.push_str(HEADER);
        msg.push('\n');
        msg.push_str(&format!("_Generated {}_\n\n", self.stamp(generated_at)));

        if signals.is_empty() {
            msg.push_str(&format!(
                "_No qualifying matches today (no signal ≥ {}%)._",
                percent(self.threshold)
            ));
            return msg;
        }

        msg.push_str(&format!("*Total signals:* {}\n\n", signals.len()));
        for s in signals {
            msg.push_str(&render_signal(s));
            msg.push('\n');
        }
        msg.push_str(FOOTER);
        msg
    }
}

fn render_signal(s: &Signal) -> String {
    let kickoff = if s.kickoff_local.is_empty() { "?" } else { &s.kickoff_local };
    let odd = s
        .avg_odd
        .map(|o| format!("{o:.2}"))
        .unwrap_or_else(|| "N/A".to_string());

    let mut block = format!("⚔️ *{}* _vs_ *{}* | _{}_\n", s.home, s.away, s.league);
    block.push_str(&format!("• Kickoff: {kickoff}\n"));
    block.push_str(&format!("• *Prediction:* {}\n", s.prediction));
    block.push_str(&format!(
        "• *Probability:* {}%  • *Average odd:* `{odd}`\n",
        percent(s.p_model)
    ));
    if !s.factors.is_empty() {
        block.push_str(&format!("• *Key factors:* {}\n", s.factors.join(", ")));
    }
    block.push_str(&format!("• *Analysis:* {}\n", s.short_analysis));
    block
}

/// Probability as a whole-number percentage.
pub fn percent(p: f64) -> u32 {
    (p * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Fixed connectivity-check message.
pub fn render_test_message(now: DateTime<Utc>) -> String {
    format!(
        "🔔 *SPOREX STATS: TEST MESSAGE*\n_Date_: {}\n\n✅ This is a test message from the SPOREX analysis bot.\n\nIf you can read this, the Telegram configuration is correct.",
        now.format("%Y-%m-%d %H:%M UTC")
    )
}
