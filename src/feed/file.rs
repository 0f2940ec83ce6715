//! File-backed event source: one JSON event envelope per line.
//!
//! Used by `smokeboard replay` and by tests. Blank lines and undecodable
//! lines are skipped with a warning, matching the live client's policy.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

use super::{EventSource, FeedError};
use crate::event::FeedEvent;

/// Replays a recorded event stream from a JSONL file.
pub struct FileSource {
    lines: Lines<BufReader<File>>,
}

impl FileSource {
    pub async fn open(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

#[async_trait]
impl EventSource for FileSource {
    async fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<FeedEvent>(line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => warn!(error = %e, "skipping undecodable event line"),
            }
        }
        Ok(None)
    }
}
