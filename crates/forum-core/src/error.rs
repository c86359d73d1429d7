//! Error types for `forum-core`.

use thiserror::Error;

use crate::{CategoryId, ReplyId, ThreadId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("username already taken: {0}")]
  DuplicateUsername(String),

  #[error("thread not found: {0}")]
  ThreadNotFound(ThreadId),

  #[error("reply not found: {0}")]
  ReplyNotFound(ReplyId),

  #[error("category_id does not exist: {0}")]
  CategoryNotFound(CategoryId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
