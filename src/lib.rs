//! Smokeboard -- live status board daemon for smoke-test results.
//!
//! Subscribes to a CI notification feed (`test_progress`, `commit_status`)
//! and projects each event onto a registry of typed board elements. The
//! board and its patch stream are served over HTTP.

pub mod api;
pub mod board;
pub mod config;
pub mod event;
pub mod feed;
pub mod projector;
pub mod status;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::api::state::AppState;
use crate::board::Board;
use crate::config::BoardConfig;

/// Queue depth between the feed subscriber and the projection loop.
const EVENT_QUEUE_DEPTH: usize = 256;
/// Patch broadcast capacity; observers past this lag re-sync via snapshot.
const PATCH_FANOUT_CAPACITY: usize = 1024;

/// Start the smokeboard daemon: feed subscriber, projection loop, and HTTP
/// server. Runs until the process is stopped.
pub async fn serve(config: BoardConfig, layout: Option<&Path>) -> Result<()> {
    // 1. Seed the board.
    let board = match layout {
        Some(path) => {
            tracing::info!(path = %path.display(), "seeding board from layout");
            let entries = board::layout::load(path)?;
            Board::from_entries(entries).context("layout contains duplicate element ids")?
        }
        None => Board::new(),
    };
    let state = AppState::new(board, PATCH_FANOUT_CAPACITY);

    // 2. Start the feed subscriber.
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    tokio::spawn(feed::client::run_feed_loop(
        config.feed.address.clone(),
        config.feed.channels.clone(),
        event_tx,
    ));

    // 3. Start the projection loop (single writer of the board).
    tokio::spawn(projector::run_projection_loop(
        state.board.clone(),
        event_rx,
        state.patches.clone(),
    ));

    // 4. Start the HTTP server.
    let app = api::router(state);
    tracing::info!(bind = %config.http.bind, "smokeboard listening");
    let listener = tokio::net::TcpListener::bind(&config.http.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.http.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
