//! The status projector.
//!
//! [`project`] is a pure function from one feed event and the current board
//! to a list of patches; it never mutates anything. [`Board::apply`] performs
//! the mutation, and [`run_projection_loop`] is the daemon task that wires
//! the two together, one event at a time, in delivery order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info};

use crate::board::{Affordance, Board, Role};
use crate::event::{CommitStatusEvent, FeedEvent, TestProgressEvent};
use crate::status::Status;

/// One mutation of one board element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub element: String,
    #[serde(flatten)]
    pub op: PatchOp,
}

/// The mutation itself, tagged for the patch stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    /// Replace the element's status (the previous one is gone; an element
    /// never carries two vocabulary values).
    SetStatus { status: Status },
    SetTooltip { tooltip: String },
    SetText { text: String },
    /// Blank the element's text.
    ClearText,
    /// Flip a retest control from "test me" to "retest me".
    MarkRetestable,
}

impl Patch {
    fn new(element: &str, op: PatchOp) -> Self {
        Patch {
            element: element.to_string(),
            op,
        }
    }
}

/// Project one event onto the board. Unmatched keys produce no patches; that
/// silence is intentional, not every board carries every element type.
pub fn project(board: &Board, event: &FeedEvent) -> Vec<Patch> {
    match event {
        FeedEvent::TestProgress(ev) => project_test_progress(board, ev),
        FeedEvent::CommitStatus(ev) => project_commit_status(board, ev),
    }
}

fn project_test_progress(board: &Board, ev: &TestProgressEvent) -> Vec<Patch> {
    let mut boxes = Vec::new();
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for (id, element) in board.iter() {
        match &element.role {
            Role::ProgressBox { sha, config } if *sha == ev.sha && *config == ev.config => {
                boxes.push(id)
            }
            Role::ConfigRow { sha, config, .. } if *sha == ev.sha && *config == ev.config => {
                rows.push(id)
            }
            Role::ShaLabel { sha, config } if *sha == ev.sha && *config == ev.config => {
                labels.push(id)
            }
            _ => {}
        }
    }

    let mut patches = Vec::new();
    for id in &boxes {
        patches.push(Patch::new(
            id,
            PatchOp::SetStatus {
                status: ev.raw_status,
            },
        ));
        patches.push(Patch::new(
            id,
            PatchOp::SetTooltip {
                tooltip: ev.status.clone(),
            },
        ));
        patches.push(Patch::new(
            id,
            PatchOp::SetText {
                text: ev.percent.to_string(),
            },
        ));
    }
    for id in &rows {
        patches.push(Patch::new(
            id,
            PatchOp::SetStatus {
                status: ev.raw_status,
            },
        ));
    }
    for id in &labels {
        patches.push(Patch::new(
            id,
            PatchOp::SetTooltip {
                tooltip: ev.status.clone(),
            },
        ));
    }
    // A percent is only meaningful while the run is live.
    if !ev.raw_status.is_live() {
        for id in &boxes {
            patches.push(Patch::new(id, PatchOp::ClearText));
        }
    }
    patches
}

fn project_commit_status(board: &Board, ev: &CommitStatusEvent) -> Vec<Patch> {
    let mut patches = Vec::new();
    for (id, element) in board.iter() {
        match &element.role {
            Role::ConfigRow { sha, big_list, .. } if *sha == ev.sha && *big_list => {
                patches.push(Patch::new(
                    id,
                    PatchOp::SetStatus {
                        status: ev.raw_status,
                    },
                ));
            }
            Role::BranchEntry { sha } if *sha == ev.sha => {
                patches.push(Patch::new(
                    id,
                    PatchOp::SetStatus {
                        status: ev.raw_status,
                    },
                ));
            }
            Role::RetestControl { sha }
                if *sha == ev.sha && element.view.affordance == Some(Affordance::Testable) =>
            {
                patches.push(Patch::new(id, PatchOp::MarkRetestable));
            }
            _ => {}
        }
    }
    patches
}

/// Project one event and apply its patches to the board, returning them.
pub fn project_and_apply(board: &mut Board, event: &FeedEvent) -> Vec<Patch> {
    let patches = project(board, event);
    for patch in &patches {
        board.apply(patch);
    }
    patches
}

/// Daemon projection task: the single consumer of the event channel and the
/// single writer of the board. Ordering and last-write-wins follow from
/// there being exactly one of these.
pub async fn run_projection_loop(
    board: Arc<RwLock<Board>>,
    mut events: mpsc::Receiver<FeedEvent>,
    patches: broadcast::Sender<Patch>,
) {
    info!("projection loop started");
    while let Some(event) = events.recv().await {
        let applied = {
            let mut board = board.write().await;
            project_and_apply(&mut board, &event)
        };
        debug!(patches = applied.len(), "event projected");
        for patch in applied {
            // Err just means nobody is watching the stream right now.
            let _ = patches.send(patch);
        }
    }
    info!("event channel closed, projection loop exiting");
}
