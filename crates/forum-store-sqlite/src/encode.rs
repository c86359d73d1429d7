//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical `ORDER BY` matches chronological order.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use forum_core::{
  CategoryId,
  reply::Reply,
  thread::{Category, Thread},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// The current time, truncated to what survives a round trip through
/// [`encode_dt`].
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `threads` read, in [`RawThread::from_row`] order.
pub const THREAD_COLUMNS: &str =
  "id, title, content, author_id, author_name, upvotes, created_at, updated_at, is_solved";

/// Raw values read directly from a `threads` row.
pub struct RawThread {
  pub id:          i64,
  pub title:       String,
  pub content:     String,
  pub author_id:   i64,
  pub author_name: String,
  pub upvotes:     i64,
  pub created_at:  String,
  pub updated_at:  String,
  pub is_solved:   bool,
}

impl RawThread {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      content:     row.get(2)?,
      author_id:   row.get(3)?,
      author_name: row.get(4)?,
      upvotes:     row.get(5)?,
      created_at:  row.get(6)?,
      updated_at:  row.get(7)?,
      is_solved:   row.get(8)?,
    })
  }
}

/// A thread row together with its `(category_id, category_name)` links.
pub struct RawThreadWithCategories {
  pub thread:     RawThread,
  pub categories: Vec<(CategoryId, String)>,
}

impl RawThreadWithCategories {
  pub fn into_thread(self) -> Result<Thread> {
    let RawThreadWithCategories { thread: t, categories } = self;
    Ok(Thread {
      id:          t.id,
      title:       t.title,
      content:     t.content,
      author_id:   t.author_id,
      author_name: t.author_name,
      upvotes:     t.upvotes,
      created_at:  decode_dt(&t.created_at)?,
      updated_at:  decode_dt(&t.updated_at)?,
      is_solved:   t.is_solved,
      categories:  categories.into_iter().collect::<BTreeMap<_, _>>(),
    })
  }
}

/// Column list shared by every `replies` read, in [`RawReply::from_row`] order.
pub const REPLY_COLUMNS: &str =
  "id, thread_id, content, author_id, author_name, created_at, is_answer";

/// Raw values read directly from a `replies` row.
pub struct RawReply {
  pub id:          i64,
  pub thread_id:   i64,
  pub content:     String,
  pub author_id:   i64,
  pub author_name: String,
  pub created_at:  String,
  pub is_answer:   bool,
}

impl RawReply {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      thread_id:   row.get(1)?,
      content:     row.get(2)?,
      author_id:   row.get(3)?,
      author_name: row.get(4)?,
      created_at:  row.get(5)?,
      is_answer:   row.get(6)?,
    })
  }

  pub fn into_reply(self) -> Result<Reply> {
    Ok(Reply {
      id:          self.id,
      thread_id:   self.thread_id,
      content:     self.content,
      author_id:   self.author_id,
      author_name: self.author_name,
      created_at:  decode_dt(&self.created_at)?,
      is_answer:   self.is_answer,
    })
  }
}

/// Raw values read directly from a `categories` row.
pub struct RawCategory {
  pub id:            i64,
  pub category_name: String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawCategory {
  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      id:            self.id,
      category_name: self.category_name,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let later = whole + chrono::Duration::milliseconds(500);
    let a = encode_dt(whole);
    let b = encode_dt(later);
    assert_eq!(a.len(), b.len());
    assert!(a < b, "{a} should sort before {b}");
  }

  #[test]
  fn dt_roundtrip_is_lossless_at_micros() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
