//! The smoke-test status vocabulary.
//!
//! Every commit/config pair is in exactly one of these states at a time;
//! modeling the vocabulary as an enum makes that mutual exclusion
//! structural rather than something each consumer re-enforces.

use serde::{Deserialize, Serialize};

/// Outcome label for one commit under one test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The build itself is broken (setup or toolchain failure).
    Broken,
    /// The test run produced errors.
    Errors,
    /// One or more tests failed.
    Failing,
    /// Tests passed with outstanding TODO items.
    Todo,
    /// All tests passed.
    Passing,
    /// The test output could not be parsed.
    Parsefail,
    /// A run is currently in progress.
    Testing,
    /// Queued, waiting for a runner.
    Queued,
    /// Never tested.
    Untested,
}

impl Status {
    /// Every vocabulary value, in display order.
    pub const ALL: [Status; 9] = [
        Status::Broken,
        Status::Errors,
        Status::Failing,
        Status::Todo,
        Status::Passing,
        Status::Parsefail,
        Status::Testing,
        Status::Queued,
        Status::Untested,
    ];

    /// Whether a run is live right now. Progress boxes only show a percent
    /// while this is true.
    pub fn is_live(self) -> bool {
        matches!(self, Status::Testing)
    }

    /// The wire/class token for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Broken => "broken",
            Status::Errors => "errors",
            Status::Failing => "failing",
            Status::Todo => "todo",
            Status::Passing => "passing",
            Status::Parsefail => "parsefail",
            Status::Testing => "testing",
            Status::Queued => "queued",
            Status::Untested => "untested",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A status token outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status token: {0:?}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form_is_lowercase_token() {
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_from_str_round_trips_all() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_token_rejected() {
        assert!("exploded".parse::<Status>().is_err());
        let err: Result<Status, _> = serde_json::from_str("\"exploded\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_only_testing_is_live() {
        for status in Status::ALL {
            assert_eq!(status.is_live(), status == Status::Testing);
        }
    }
}
