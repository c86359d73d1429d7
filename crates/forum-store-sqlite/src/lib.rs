//! SQLite backend for the forum repositories.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every call is bounded by a deadline;
//! multi-statement writes run inside a single transaction.

mod encode;
mod replies;
mod schema;
mod stars;
mod store;
mod threads;
mod users;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_TIMEOUT, SqliteStore};
