//! API route definitions.

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::state::AppState;
use crate::board::layout::LayoutEntry;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/board", get(board_snapshot))
        .route("/board/commits/{sha}", get(commit_elements))
        .route("/board/elements", post(register_elements))
        .route(
            "/board/elements/{id}",
            axum::routing::delete(remove_element),
        )
        .route("/patches", get(patch_stream))
}

fn meta() -> Value {
    json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": { "status": "ok" },
        "meta": meta()
    }))
}

async fn board_snapshot(State(state): State<AppState>) -> Json<Value> {
    let board = state.board.read().await;
    Json(json!({
        "data": &*board,
        "meta": { "elements": board.len(), "timestamp": chrono::Utc::now().to_rfc3339() }
    }))
}

async fn commit_elements(
    State(state): State<AppState>,
    Path(sha): Path<String>,
) -> Json<Value> {
    let board = state.board.read().await;
    let elements: BTreeMap<_, _> = board.commit_elements(&sha).collect();
    let count = elements.len();
    Json(json!({
        "data": elements,
        "meta": { "sha": sha, "elements": count }
    }))
}

async fn register_elements(
    State(state): State<AppState>,
    Json(entries): Json<Vec<LayoutEntry>>,
) -> (StatusCode, Json<Value>) {
    let mut board = state.board.write().await;

    // Reject the whole batch before touching the board: ids must be fresh
    // and unique within the request.
    let mut seen = std::collections::BTreeSet::new();
    for entry in &entries {
        if board.get(&entry.id).is_some() || !seen.insert(&entry.id) {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": format!("duplicate element id: {}", entry.id) })),
            );
        }
    }

    let count = entries.len();
    for entry in entries {
        // Infallible after the batch check above.
        if let Err(e) = board.insert(&entry.id, entry.role) {
            warn!(error = %e, "element registration raced");
        }
    }

    (
        StatusCode::CREATED,
        Json(json!({ "data": { "registered": count }, "meta": meta() })),
    )
}

async fn remove_element(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut board = state.board.write().await;
    match board.remove(&id) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "data": { "removed": id }, "meta": meta() })),
        ),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

/// Live patch stream. Each SSE event is one applied patch; a slow observer
/// lags and drops patches rather than stalling projection, and re-syncs from
/// the snapshot endpoint.
async fn patch_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.patches.subscribe();
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(patch) => match serde_json::to_string(&patch) {
                    Ok(json) => {
                        return Some((Ok(SseEvent::default().event("patch").data(json)), rx))
                    }
                    Err(e) => warn!(error = %e, "failed to serialize patch"),
                },
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "patch observer lagged, dropping patches");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
