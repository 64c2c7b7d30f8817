//! Model and audit log status handlers

use axum::{extract::State, Json};

use risk_review_core::logic::model::ModelStatus;
use risk_review_core::AuditStats;

use crate::{AppResult, AppState};

/// Loaded model and inference counters
pub async fn model(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.pipeline.model().status())
}

/// Audit log totals
pub async fn audit(State(state): State<AppState>) -> AppResult<Json<AuditStats>> {
    let pipeline = state.pipeline.clone();
    let stats = tokio::task::spawn_blocking(move || pipeline.audit().stats()).await??;

    Ok(Json(stats))
}
