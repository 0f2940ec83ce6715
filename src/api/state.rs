use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::board::Board;
use crate::projector::Patch;

#[derive(Clone)]
pub struct AppState {
    /// The live board. The projection loop is the only steady-state writer;
    /// handlers take the write lock only to register/remove elements.
    pub board: Arc<RwLock<Board>>,
    /// Fan-out of applied patches to SSE observers.
    pub patches: broadcast::Sender<Patch>,
}

impl AppState {
    pub fn new(board: Board, patch_capacity: usize) -> Self {
        let (patches, _) = broadcast::channel(patch_capacity);
        Self {
            board: Arc::new(RwLock::new(board)),
            patches,
        }
    }
}
