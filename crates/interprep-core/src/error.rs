//! Error types for the InterPrep application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire InterPrep application.
///
/// This provides typed, structured error variants so that flow
/// controllers can apply a uniform degrade-to-fallback policy instead
/// of catching exceptions ad hoc per call site.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PrepError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Text generation error (external LLM service)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Storage error (repository/database layer)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed slash command arguments; the message is user-facing usage text
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PrepError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an InvalidCommand error carrying user-facing usage text
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Generation error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Check if this is a Storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Check if this is an InvalidCommand error
    pub fn is_invalid_command(&self) -> bool {
        matches!(self, Self::InvalidCommand(_))
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PrepError>`.
pub type Result<T> = std::result::Result<T, PrepError>;
