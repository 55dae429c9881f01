//! Persistence layer.
//!
//! Three JSON files: the per-run snapshot (overwritten every run), the
//! used-messages ledger of the content poster, and the read-only content
//! pool. No locking: a single pipeline instance is assumed to run at a time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::types::{RunSnapshot, SporexError};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Write the run snapshot. Goes through a sibling temp file and a rename
/// so readers never observe a half-written document.
pub fn save_snapshot(snapshot: &RunSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| SporexError::Storage(format!("run snapshot: {e}")))?;
    write_replacing(path, &json)?;
    info!(path = %path.display(), signals = snapshot.signals.len(), "Snapshot written");
    Ok(())
}

/// Load the run snapshot. `None` if the file doesn't exist.
pub fn load_snapshot(path: &Path) -> Result<Option<RunSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
    let snapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse snapshot from {}", path.display()))?;
    Ok(Some(snapshot))
}

// ---------------------------------------------------------------------------
// Used-messages ledger
// ---------------------------------------------------------------------------

/// Load previously sent canned messages. A missing or unreadable ledger is
/// treated as empty.
pub fn load_used(path: &Path) -> Vec<String> {
    if !path.exists() {
        debug!(path = %path.display(), "No used-messages ledger yet");
        return Vec::new();
    }
    match fs::read_to_string(path).map(|s| serde_json::from_str::<Vec<String>>(&s)) {
        Ok(Ok(used)) => used,
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "Corrupt used-messages ledger, starting empty");
            Vec::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable used-messages ledger, starting empty");
            Vec::new()
        }
    }
}

pub fn save_used(path: &Path, used: &[String]) -> Result<()> {
    let json = serde_json::to_string_pretty(used)
        .map_err(|e| SporexError::Storage(format!("used-messages ledger: {e}")))?;
    write_replacing(path, &json)?;
    debug!(path = %path.display(), entries = used.len(), "Used-messages ledger saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Content pool
// ---------------------------------------------------------------------------

fn default_quote_chance() -> f64 {
    0.25
}

/// Canned messages for the content poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPool {
    #[serde(default)]
    pub messages: Vec<String>,
    /// Probability of substituting an external quote for a pool message.
    #[serde(default = "default_quote_chance")]
    pub quote_chance: f64,
}

impl Default for ContentPool {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            quote_chance: default_quote_chance(),
        }
    }
}

/// Load the content pool. Missing or invalid files yield an empty pool.
pub fn load_content(path: &Path) -> ContentPool {
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<ContentPool>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(pool) => pool,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Content file unavailable, using empty pool");
            ContentPool::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
