//! Dashboard API route handlers.
//!
//! The snapshot file is re-read on every request; the dashboard never
//! writes it.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::storage;
use crate::types::RunSnapshot;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub snapshot_path: PathBuf,
}

impl DashboardState {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self { snapshot_path: snapshot_path.into() }
    }
}

pub type AppState = Arc<DashboardState>;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/signals
pub async fn get_signals(
    State(state): State<AppState>,
) -> Result<Json<RunSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    match storage::load_snapshot(&state.snapshot_path) {
        Ok(Some(snapshot)) => {
            debug!(signals = snapshot.signals.len(), "Serving snapshot");
            Ok(Json(snapshot))
        }
        Ok(None) => Err(not_found("no snapshot yet, run the analysis first".to_string())),
        Err(e) => {
            warn!(path = %state.snapshot_path.display(), error = %e, "Snapshot unreadable");
            Err(not_found(format!("snapshot unreadable: {e}")))
        }
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

fn not_found(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error }))
}
