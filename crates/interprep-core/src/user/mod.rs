//! User profile domain model and repository trait.

mod model;
mod repository;

pub use model::{Level, Track, UserProfile};
pub use repository::UserRepository;
