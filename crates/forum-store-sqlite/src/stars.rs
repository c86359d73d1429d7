//! [`StarRepository`] for [`SqliteStore`].
//!
//! `list_starred` comes from the trait's default, which delegates to
//! [`ThreadRepository::starred_threads`](forum_core::store::ThreadRepository::starred_threads).

use forum_core::{ThreadId, UserId, store::StarRepository, thread::Star};
use rusqlite::params;

use crate::{
  Result, SqliteStore,
  encode::{encode_dt, now},
};

impl StarRepository for SqliteStore {
  async fn star(&self, user_id: UserId, thread_id: ThreadId) -> Result<Star> {
    let created_at = now();
    let at = encode_dt(created_at);

    self
      .call(move |conn| {
        conn.execute(
          "INSERT INTO starred_threads (user_id, thread_id, created_at) VALUES (?1, ?2, ?3)",
          params![user_id, thread_id, at],
        )?;
        Ok(())
      })
      .await?;

    Ok(Star { user_id, thread_id, created_at })
  }

  async fn unstar(&self, user_id: UserId, thread_id: ThreadId) -> Result<()> {
    self
      .call(move |conn| {
        conn.execute(
          "DELETE FROM starred_threads WHERE user_id = ?1 AND thread_id = ?2",
          params![user_id, thread_id],
        )?;
        Ok(())
      })
      .await
  }
}
