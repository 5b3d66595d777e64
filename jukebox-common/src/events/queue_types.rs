//! Queue type definitions
//!
//! Supporting types for queue management events.

use serde::{Deserialize, Serialize};

/// Why the queue changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum QueueChangeTrigger {
    UserEnqueue,
    UserDequeue,
    UserReorder,
    UserClear,
    TrackAdvance,
}

impl std::fmt::Display for QueueChangeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueChangeTrigger::UserEnqueue => write!(f, "UserEnqueue"),
            QueueChangeTrigger::UserDequeue => write!(f, "UserDequeue"),
            QueueChangeTrigger::UserReorder => write!(f, "UserReorder"),
            QueueChangeTrigger::UserClear => write!(f, "UserClear"),
            QueueChangeTrigger::TrackAdvance => write!(f, "TrackAdvance"),
        }
    }
}

/// Where a batch of tracks is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Before the prior head ("play next")
    Head,
    /// After the prior tail ("play last")
    Tail,
}
