//! Application layer: flow controllers and the message dispatcher.
//!
//! This crate wires the intent router, the conversation state store,
//! the generation adapter and the repositories into one
//! `MessageHandler` that turns an inbound message into a reply. It is
//! transport-agnostic; the REPL binary is just one front end.

pub mod flows;
pub mod handler;
pub mod reply;

pub use handler::{MessageHandler, Repositories};
pub use reply::Reply;
