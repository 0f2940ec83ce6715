//! Board layout documents.
//!
//! A layout is the markup generator's side of the contract: a JSON list of
//! element entries, each an id plus a role. Layouts seed a board at daemon
//! start (`--layout`), feed the `replay` command, and are the body of the
//! element-registration API.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{Board, BoardError, Role};

/// One element entry in a layout document.
///
/// Serialized flat: `{ "id": "box-1", "kind": "progress_box", "sha": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: String,
    #[serde(flatten)]
    pub role: Role,
}

/// Parse a layout document from a JSON string.
pub fn parse(json: &str) -> Result<Vec<LayoutEntry>> {
    serde_json::from_str(json).context("failed to parse layout document")
}

/// Load a layout document from a file.
pub fn load(path: &Path) -> Result<Vec<LayoutEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read layout file: {}", path.display()))?;
    parse(&content)
}

impl Board {
    /// Build a board from layout entries. Fails on duplicate ids.
    pub fn from_entries(entries: Vec<LayoutEntry>) -> Result<Self, BoardError> {
        let mut board = Board::new();
        for entry in entries {
            board.insert(&entry.id, entry.role)?;
        }
        Ok(board)
    }
}
