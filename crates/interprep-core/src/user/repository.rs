//! User repository trait.

use super::model::{Level, Track, UserProfile};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for user profiles.
///
/// Decouples the flow controllers from the concrete storage mechanism
/// (SQLite, in-memory). Implementations must touch `last_active` on
/// `get_or_create`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the profile for `user_id`, creating a default one if absent.
    async fn get_or_create(&self, user_id: &str) -> Result<UserProfile>;

    /// Updates the user's level and track (set by `/begin`).
    async fn update_level_track(&self, user_id: &str, level: Level, track: Track) -> Result<()>;
}
