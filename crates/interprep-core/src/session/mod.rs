//! Conversation session state: the per-user mode and slot values that
//! track a user through a multi-turn flow.

mod model;
mod store;

pub use model::{Mode, UserSession, slot};
pub use store::{InMemorySessionStore, SessionStore};
