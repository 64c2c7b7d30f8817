//! Review form + submission handlers

use axum::{extract::State, response::Html, Form, Json};

use risk_review_core::{RawSubmission, ReviewOutcome};

use crate::{AppResult, AppState};

const FORM_PAGE: &str = include_str!("../../static/form.html");

/// Serve the review form
pub async fn form() -> Html<&'static str> {
    Html(FORM_PAGE)
}

/// Review one submission: verdict is returned only once it is audited
pub async fn submit(
    State(state): State<AppState>,
    Form(raw): Form<RawSubmission>,
) -> AppResult<Json<ReviewOutcome>> {
    tracing::debug!("Review submitted with {} fields", raw.len());

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.review(&raw)).await??;

    Ok(Json(outcome))
}
