//! Feed event schema.
//!
//! The notification feed delivers named messages on two channels. Every
//! inbound frame is one [`FeedEvent`] envelope, serialized as
//! internally-tagged JSON (`"channel": "..."`) so a consumer can dispatch on
//! the channel name without parsing the full body first.

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Channel carrying per-configuration progress updates.
pub const CHANNEL_TEST_PROGRESS: &str = "test_progress";
/// Channel carrying per-commit aggregate status changes.
pub const CHANNEL_COMMIT_STATUS: &str = "commit_status";

/// Channels a board subscriber listens on by default.
pub fn default_channels() -> Vec<String> {
    vec![
        CHANNEL_TEST_PROGRESS.to_string(),
        CHANNEL_COMMIT_STATUS.to_string(),
    ]
}

/// One message from the notification feed.
///
/// Serialized as `{ "channel": "<name>", ...payload fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A test run for one commit+config moved forward.
    TestProgress(TestProgressEvent),
    /// The aggregate status of a commit changed.
    CommitStatus(CommitStatusEvent),
}

/// Payload of the `test_progress` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestProgressEvent {
    /// Commit identifier the run belongs to.
    pub sha: String,
    /// Test configuration the run belongs to.
    pub config: String,
    /// Current vocabulary status of the run.
    pub raw_status: Status,
    /// Human-readable status line, used as tooltip text.
    pub status: String,
    /// Percent-complete display value.
    pub percent: Percent,
}

/// Payload of the `commit_status` channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitStatusEvent {
    /// Commit identifier.
    pub sha: String,
    /// New aggregate status for the commit.
    pub raw_status: Status,
}

/// Progress display value.
///
/// Producers send either a preformatted string (`"73%"`) or a bare number;
/// both render verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Percent {
    Text(String),
    Number(f64),
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Percent::Text(s) => f.write_str(s),
            Percent::Number(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_envelope_round_trip() {
        let event = FeedEvent::TestProgress(TestProgressEvent {
            sha: "abc123".to_string(),
            config: "linux-x64".to_string(),
            raw_status: Status::Testing,
            status: "73 of 100 test files".to_string(),
            percent: Percent::Text("73%".to_string()),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"channel\":\"test_progress\""));
        assert!(json.contains("\"raw_status\":\"testing\""));

        let decoded: FeedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_commit_status_envelope_round_trip() {
        let json = r#"{"channel":"commit_status","sha":"abc123","raw_status":"queued"}"#;
        let decoded: FeedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            decoded,
            FeedEvent::CommitStatus(CommitStatusEvent {
                sha: "abc123".to_string(),
                raw_status: Status::Queued,
            })
        );
    }

    #[test]
    fn test_numeric_percent_accepted() {
        let json = r#"{"channel":"test_progress","sha":"a","config":"c",
                       "raw_status":"testing","status":"running","percent":42}"#;
        let decoded: FeedEvent = serde_json::from_str(json).unwrap();
        match decoded {
            FeedEvent::TestProgress(ev) => assert_eq!(ev.percent.to_string(), "42"),
            other => panic!("expected test_progress, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let json = r#"{"channel":"deploy_status","sha":"a","raw_status":"passing"}"#;
        assert!(serde_json::from_str::<FeedEvent>(json).is_err());
    }

    #[test]
    fn test_unknown_status_rejected_at_decode() {
        let json = r#"{"channel":"commit_status","sha":"a","raw_status":"exploded"}"#;
        assert!(serde_json::from_str::<FeedEvent>(json).is_err());
    }
}
