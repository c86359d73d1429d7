//! [`ThreadRepository`] for [`SqliteStore`].
//!
//! Each returned thread carries its category map, loaded with one extra
//! lookup per thread on the same connection call.

use forum_core::{
  CategoryId, ThreadId, UserId,
  store::ThreadRepository,
  thread::{Category, NewThread, Thread, ThreadEdit},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result, SqliteStore,
  encode::{
    RawCategory, RawThread, RawThreadWithCategories, THREAD_COLUMNS, encode_dt,
    now,
  },
};

// ─── Connection-level helpers ────────────────────────────────────────────────

/// Outcome of an update that may hit a missing row. Returning early drops the
/// transaction, which rolls it back.
enum Write<T> {
  Done(T),
  MissingThread,
  MissingCategory,
}

fn load_categories(
  conn: &Connection,
  thread_id: ThreadId,
) -> rusqlite::Result<Vec<(CategoryId, String)>> {
  let mut stmt = conn.prepare_cached(
    "SELECT tc.category_id, c.category_name
     FROM threads_categories tc
     JOIN categories c ON c.id = tc.category_id
     WHERE tc.thread_id = ?1
     ORDER BY tc.id",
  )?;
  let links = stmt
    .query_map(params![thread_id], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect();
  links
}

fn attach_categories(
  conn: &Connection,
  thread: RawThread,
) -> rusqlite::Result<RawThreadWithCategories> {
  let categories = load_categories(conn, thread.id)?;
  Ok(RawThreadWithCategories { thread, categories })
}

fn load_thread(
  conn: &Connection,
  id: ThreadId,
) -> rusqlite::Result<Option<RawThreadWithCategories>> {
  let raw = conn
    .query_row(
      &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?1"),
      params![id],
      RawThread::from_row,
    )
    .optional()?;
  raw.map(|t| attach_categories(conn, t)).transpose()
}

fn query_threads(
  conn: &Connection,
  sql: &str,
  args: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawThreadWithCategories>> {
  let mut stmt = conn.prepare(sql)?;
  let threads = stmt
    .query_map(args, RawThread::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  threads
    .into_iter()
    .map(|t| attach_categories(conn, t))
    .collect()
}

fn category_exists(conn: &Connection, id: CategoryId) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
    params![id],
    |row| row.get(0),
  )
}

fn decode_all(raws: Vec<RawThreadWithCategories>) -> Result<Vec<Thread>> {
  raws.into_iter().map(RawThreadWithCategories::into_thread).collect()
}

// ─── ThreadRepository impl ───────────────────────────────────────────────────

impl ThreadRepository for SqliteStore {
  async fn get_thread(&self, id: ThreadId) -> Result<Option<Thread>> {
    let raw = self.call(move |conn| Ok(load_thread(conn, id)?)).await?;
    raw.map(RawThreadWithCategories::into_thread).transpose()
  }

  async fn list_threads(&self, category: Option<CategoryId>) -> Result<Vec<Thread>> {
    let raws = self
      .call(move |conn| {
        let rows = match category {
          Some(category_id) => query_threads(
            conn,
            &format!(
              "SELECT {THREAD_COLUMNS} FROM threads
               WHERE id IN (SELECT thread_id FROM threads_categories WHERE category_id = ?1)
               ORDER BY id DESC"
            ),
            params![category_id],
          )?,
          None => query_threads(
            conn,
            &format!("SELECT {THREAD_COLUMNS} FROM threads ORDER BY id DESC"),
            params![],
          )?,
        };
        Ok(rows)
      })
      .await?;

    decode_all(raws)
  }

  async fn threads_by_author(&self, author_id: UserId) -> Result<Vec<Thread>> {
    let raws = self
      .call(move |conn| {
        Ok(query_threads(
          conn,
          &format!(
            "SELECT {THREAD_COLUMNS} FROM threads
             WHERE author_id = ?1
             ORDER BY created_at DESC, id DESC"
          ),
          params![author_id],
        )?)
      })
      .await?;

    decode_all(raws)
  }

  async fn starred_threads(&self, user_id: UserId) -> Result<Vec<Thread>> {
    let raws = self
      .call(move |conn| {
        Ok(query_threads(
          conn,
          "SELECT t.id, t.title, t.content, t.author_id, t.author_name,
                  t.upvotes, t.created_at, t.updated_at, t.is_solved
           FROM threads t
           JOIN starred_threads s ON s.thread_id = t.id
           WHERE s.user_id = ?1
           ORDER BY s.created_at DESC, s.id DESC",
          params![user_id],
        )?)
      })
      .await?;

    decode_all(raws)
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let raws: Vec<RawCategory> = self
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, category_name, created_at, updated_at FROM categories ORDER BY id ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCategory {
              id:            row.get(0)?,
              category_name: row.get(1)?,
              created_at:    row.get(2)?,
              updated_at:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  async fn insert_thread(&self, input: NewThread) -> Result<Thread> {
    let category_id = input.category_id;
    let at = encode_dt(now());

    let inserted = self
      .call_with_deadline(move |conn, deadline| {
        let tx = conn.transaction()?;

        if !category_exists(&tx, category_id)? {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO threads (
             title, content, author_id, author_name, upvotes,
             created_at, updated_at, is_solved
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5, 0)",
          params![input.title, input.content, input.author_id, input.author_name, at],
        )?;
        let thread_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO threads_categories (thread_id, category_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          params![thread_id, category_id, at],
        )?;

        let raw = load_thread(&tx, thread_id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        deadline.check()?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    inserted
      .ok_or(forum_core::Error::CategoryNotFound(category_id))?
      .into_thread()
  }

  async fn update_thread(&self, edit: ThreadEdit) -> Result<Thread> {
    let ThreadEdit { id, title, content, category_id } = edit;
    let at = encode_dt(now());

    let outcome = self
      .call_with_deadline(move |conn, deadline| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE threads SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
          params![title, content, at, id],
        )?;
        if changed == 0 {
          return Ok(Write::MissingThread);
        }

        if !category_exists(&tx, category_id)? {
          return Ok(Write::MissingCategory);
        }

        let linked = tx.execute(
          "UPDATE threads_categories SET category_id = ?1, updated_at = ?2 WHERE thread_id = ?3",
          params![category_id, at, id],
        )?;
        if linked == 0 {
          tx.execute(
            "INSERT INTO threads_categories (thread_id, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![id, category_id, at],
          )?;
        }

        let raw = load_thread(&tx, id)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        deadline.check()?;
        tx.commit()?;
        Ok(Write::Done(raw))
      })
      .await?;

    match outcome {
      Write::Done(raw) => raw.into_thread(),
      Write::MissingThread => Err(forum_core::Error::ThreadNotFound(id).into()),
      Write::MissingCategory => {
        Err(forum_core::Error::CategoryNotFound(category_id).into())
      }
    }
  }

  async fn delete_thread(&self, id: ThreadId) -> Result<()> {
    self
      .call_with_deadline(move |conn, deadline| {
        let tx = conn.transaction()?;
        // The join row references the thread, so it goes first.
        tx.execute("DELETE FROM threads_categories WHERE thread_id = ?1", params![id])?;
        tx.execute("DELETE FROM threads WHERE id = ?1", params![id])?;
        deadline.check()?;
        tx.commit()?;
        Ok(())
      })
      .await
  }

  async fn toggle_solved(&self, id: ThreadId) -> Result<Thread> {
    let raw = self
      .call(move |conn| {
        let toggled = conn
          .query_row(
            &format!(
              "UPDATE threads SET is_solved = NOT is_solved WHERE id = ?1
               RETURNING {THREAD_COLUMNS}"
            ),
            params![id],
            RawThread::from_row,
          )
          .optional()?;
        Ok(toggled.map(|t| attach_categories(conn, t)).transpose()?)
      })
      .await?;

    raw
      .ok_or(forum_core::Error::ThreadNotFound(id))?
      .into_thread()
  }
}
