//! Persistence Adapter: concrete implementations of the core
//! repository traits. SQLite (via sqlx) is the durable backend; the
//! in-memory implementations back tests and database-less runs.

pub mod memory;
pub mod sqlite;
