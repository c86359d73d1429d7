//! Error type for `forum-store-sqlite`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain failure (missing row, missing category, duplicate username).
  #[error(transparent)]
  Core(#[from] forum_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The call did not finish within the store's per-call deadline.
  #[error("store call exceeded its {0:?} deadline")]
  Timeout(Duration),
}

impl Error {
  /// The domain error, if this is one.
  pub fn as_core(&self) -> Option<&forum_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
