//! User profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Seniority level a user is preparing for.
///
/// The set is fixed; `/begin` rejects anything outside it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Level {
    Junior,
    Middle,
    Senior,
}

impl Default for Level {
    fn default() -> Self {
        Level::Junior
    }
}

/// Engineering track (domain) a user is preparing for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Track {
    Backend,
    Frontend,
    Python,
    Java,
    Data,
}

impl Default for Track {
    fn default() -> Self {
        Track::Backend
    }
}

/// Durable per-user profile.
///
/// Created on first contact with default level/track; `/begin` updates
/// both. The profile provides the level/track context that flows pass
/// to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user identifier supplied by the transport
    pub user_id: String,
    /// Optional display name
    pub username: Option<String>,
    /// Current seniority level
    pub level: Level,
    /// Current engineering track
    pub track: Track,
    /// Timestamp when the profile was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last inbound message
    pub last_active: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a fresh profile with default level/track.
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            username: None,
            level: Level::default(),
            track: Track::default(),
            created_at: now,
            last_active: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(Level::from_str("junior").unwrap(), Level::Junior);
        assert_eq!(Level::from_str("MIDDLE").unwrap(), Level::Middle);
        assert_eq!(Level::from_str("Senior").unwrap(), Level::Senior);
        assert!(Level::from_str("principal").is_err());
    }

    #[test]
    fn track_parses_fixed_set_only() {
        assert_eq!(Track::from_str("backend").unwrap(), Track::Backend);
        assert_eq!(Track::from_str("data").unwrap(), Track::Data);
        assert!(Track::from_str("mobile").is_err());
    }

    #[test]
    fn new_profile_uses_defaults() {
        let profile = UserProfile::new("u1");
        assert_eq!(profile.level, Level::Junior);
        assert_eq!(profile.track, Track::Backend);
    }
}
