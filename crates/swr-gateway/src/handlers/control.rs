//! Worker administration: stats and control messages.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use swr_router::{ControlMessage, MessageOutcome, StatsSnapshot, WorkerState};

use crate::state::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    pub state: WorkerState,
    pub controlling: bool,
    pub stats: StatsSnapshot,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let worker = &state.worker;
    Json(StatsResponse {
        state: worker.state(),
        controlling: worker.is_controlling(),
        stats: worker.router().stats().snapshot(),
    })
}

/// Accepts `{ "type": ..., "payload": ... }`. Malformed bodies are rejected
/// by the JSON extractor before reaching the worker.
pub async fn message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ControlMessage>,
) -> Json<MessageOutcome> {
    Json(state.worker.handle_message(message).await)
}
