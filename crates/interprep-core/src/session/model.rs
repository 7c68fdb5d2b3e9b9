//! Session domain model.
//!
//! A `UserSession` holds the single source of truth for where a user
//! currently is in a conversation: the current mode plus the slot
//! values collected so far. The original bot kept this state in two
//! independent places (a router-local map and a transport-level state
//! object); here it is consolidated into one model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

/// The current named state of a user's conversation.
///
/// At most one mode is active per user at a time. `Idle` means no flow
/// is in progress and the next message goes through the intent router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// No flow in progress
    Idle,
    /// Assessment flow: waiting for a free-text skills description
    AwaitingSkills,
    /// Planning flow: waiting for the learning topic
    CollectingPlanGoal,
    /// Planning flow: waiting for the skill level
    CollectingPlanLevel,
    /// Planning flow: waiting for the weekly time commitment
    CollectingPlanTime,
    /// Planning flow: plan generated, waiting for a yes/no confirmation
    ConfirmingPlan,
    /// Interview flow: a question was asked, waiting for the answer
    AwaitingInterviewAnswer,
    /// Review flow: waiting for a code snippet
    AwaitingCode,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Idle
    }
}

/// Well-known slot names used by the flow controllers.
pub mod slot {
    /// Learning topic collected by the planning flow
    pub const TOPIC: &str = "topic";
    /// Classified skill level (beginner/intermediate/advanced)
    pub const LEVEL: &str = "level";
    /// Plan duration in weeks, derived from the time bucket
    pub const WEEKS: &str = "weeks";
    /// Serialized plan summary awaiting confirmation
    pub const PLAN: &str = "plan";
    /// Interview question the user is currently answering
    pub const QUESTION: &str = "question";
}

/// Per-user conversation state: current mode and accumulated slots.
///
/// Invariant: the slots present are only those valid for the current
/// mode; `clear` resets to idle and drops all slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    /// Opaque user identifier
    pub user_id: String,
    /// Current conversation mode
    pub mode: Mode,
    /// Named values collected so far in the active flow
    pub slots: HashMap<String, String>,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation (drives TTL expiry)
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    /// Creates an idle session with no slots.
    pub fn idle(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            mode: Mode::Idle,
            slots: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true when no flow is in progress.
    pub fn is_idle(&self) -> bool {
        self.mode == Mode::Idle
    }

    /// Returns a collected slot value, if present.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }
}
