//! Routing decision model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

/// The capability a message is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Capability {
    /// Skills assessment
    Assessor,
    /// Learning-plan creation
    Planner,
    /// Interview practice
    Interviewer,
    /// Code review
    Reviewer,
    /// Generic help fallback
    Helper,
}

/// The outcome of routing a single inbound message.
///
/// Produced fresh per message and consumed immediately by the
/// dispatcher; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    /// Target capability
    pub capability: Capability,
    /// Free-text rationale for logging and debugging
    pub rationale: String,
    /// Fixed per-rule confidence in [0, 1]
    pub confidence: f32,
    /// Auxiliary metadata (e.g. the raw skills payload)
    pub metadata: HashMap<String, String>,
    /// Optional follow-up topic suggestions
    pub suggested_topics: Option<Vec<String>>,
}

impl RouteDecision {
    /// Creates a decision with empty metadata.
    pub fn new(capability: Capability, rationale: impl Into<String>, confidence: f32) -> Self {
        Self {
            capability,
            rationale: rationale.into(),
            confidence,
            metadata: HashMap::new(),
            suggested_topics: None,
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
