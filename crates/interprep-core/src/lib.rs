pub mod command;
pub mod error;
pub mod planning;
pub mod record;
pub mod router;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::PrepError;
