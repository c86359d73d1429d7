//! [`ReplyRepository`] for [`SqliteStore`].

use forum_core::{
  ReplyId, ThreadId,
  reply::{NewReply, Reply},
  store::ReplyRepository,
};
use rusqlite::{OptionalExtension as _, params};

use crate::{
  Result, SqliteStore,
  encode::{REPLY_COLUMNS, RawReply, encode_dt, now},
};

impl ReplyRepository for SqliteStore {
  async fn list_replies(&self, thread_id: ThreadId) -> Result<Vec<Reply>> {
    let raws: Vec<RawReply> = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REPLY_COLUMNS} FROM replies
           WHERE thread_id = ?1
           ORDER BY is_answer DESC, created_at ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map(params![thread_id], RawReply::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReply::into_reply).collect()
  }

  async fn insert_reply(&self, input: NewReply) -> Result<Reply> {
    let created_at = now();
    let at = encode_dt(created_at);
    let NewReply { thread_id, content, author_id, author_name } = input;
    let (c, n) = (content.clone(), author_name.clone());

    // Parent check and insert are one statement.
    let id: Option<ReplyId> = self
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO replies (thread_id, content, author_id, author_name, created_at, is_answer)
           SELECT ?1, ?2, ?3, ?4, ?5, 0
           WHERE EXISTS (SELECT 1 FROM threads WHERE id = ?1)",
          params![thread_id, c, author_id, n, at],
        )?;
        Ok((inserted == 1).then(|| conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or(forum_core::Error::ThreadNotFound(thread_id))?;
    Ok(Reply {
      id,
      thread_id,
      content,
      author_id,
      author_name,
      created_at,
      is_answer: false,
    })
  }

  async fn delete_reply(&self, id: ReplyId) -> Result<()> {
    self
      .call(move |conn| {
        conn.execute("DELETE FROM replies WHERE id = ?1", params![id])?;
        Ok(())
      })
      .await
  }

  async fn toggle_answer(&self, id: ReplyId) -> Result<Reply> {
    let raw = self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE replies SET is_answer = NOT is_answer WHERE id = ?1
                 RETURNING {REPLY_COLUMNS}"
              ),
              params![id],
              RawReply::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(forum_core::Error::ReplyNotFound(id))?.into_reply()
  }
}
