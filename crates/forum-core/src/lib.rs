//! Core types and repository traits for the forum backend.
//!
//! This crate has no HTTP or database dependencies.
//! The storage backend and the API layer both depend on it.

pub mod error;
pub mod reply;
pub mod store;
pub mod thread;
pub mod user;

pub use error::{Error, Result};

/// Row id of a user.
pub type UserId = i64;
/// Row id of a thread.
pub type ThreadId = i64;
/// Row id of a category.
pub type CategoryId = i64;
/// Row id of a reply.
pub type ReplyId = i64;
