//! Generation Adapter: the boundary to the external text-generation
//! service. The rest of the system only sees the `GenerationAgent`
//! trait; concrete implementations talk to the GigaChat REST API or
//! replay scripted responses for tests and offline runs.

pub mod gigachat_api_agent;
pub mod request;
pub mod scripted_agent;

pub use gigachat_api_agent::GigaChatApiAgent;
pub use request::GenerationRequest;
pub use scripted_agent::ScriptedAgent;

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of the external generation service.
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication or token acquisition failed
    #[error("Auth error: {0}")]
    Auth(String),

    /// The API answered but produced no usable content
    #[error("Empty response from generation service")]
    EmptyResponse,

    /// The call exceeded the configured deadline
    #[error("Generation timed out")]
    Timeout,
}

/// A text-generation backend.
///
/// Latency is unspecified (assume seconds-scale) and failures are
/// expected; callers bound each call with a timeout and degrade to a
/// canned fallback on any error.
#[async_trait]
pub trait GenerationAgent: Send + Sync {
    /// Generates natural-language content for a structured request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
