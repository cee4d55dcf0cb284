//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::Envelope;

/// Aggregated backend health
///
/// Always 200. A failing backend shows up as `{status: "error", details}`
/// under its key and flips `data.status` to "error".
#[utoipa::path(
    get,
    path = "/composite/health",
    responses(
        (status = 200, description = "Combined backend health", body = Envelope, content_type = "application/json")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Envelope> {
    Json(state.composite(None).health().await)
}
