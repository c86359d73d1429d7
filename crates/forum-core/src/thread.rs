//! Threads, categories and the star bookmark.
//!
//! A thread is linked to exactly one category through the
//! `threads_categories` join table. On read the link is materialised as a
//! `category_id → category_name` map so clients need no second lookup.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct as _};

use crate::{CategoryId, ThreadId, UserId};

// ─── Thread ──────────────────────────────────────────────────────────────────

/// A discussion thread with its category association attached.
///
/// Serialises with an extra `category_id` field (`null` without a link)
/// alongside the `categories` map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Thread {
  pub id:          ThreadId,
  pub title:       String,
  pub content:     String,
  pub author_id:   UserId,
  pub author_name: String,
  pub upvotes:     i64,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub is_solved:   bool,
  /// Empty when the thread has no category link.
  pub categories:  BTreeMap<CategoryId, String>,
}

impl Thread {
  /// The id of the thread's category, if it has one.
  pub fn category_id(&self) -> Option<CategoryId> {
    self.categories.keys().next().copied()
  }
}

impl Serialize for Thread {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("Thread", 11)?;
    s.serialize_field("id", &self.id)?;
    s.serialize_field("title", &self.title)?;
    s.serialize_field("content", &self.content)?;
    s.serialize_field("author_id", &self.author_id)?;
    s.serialize_field("author_name", &self.author_name)?;
    s.serialize_field("upvotes", &self.upvotes)?;
    s.serialize_field("created_at", &self.created_at)?;
    s.serialize_field("updated_at", &self.updated_at)?;
    s.serialize_field("is_solved", &self.is_solved)?;
    s.serialize_field("categories", &self.categories)?;
    s.serialize_field("category_id", &self.category_id())?;
    s.end()
  }
}

/// Input for [`ThreadRepository::insert_thread`](crate::store::ThreadRepository::insert_thread).
///
/// Timestamps, the upvote counter and the solved flag are set by the store.
#[derive(Debug, Clone)]
pub struct NewThread {
  pub title:       String,
  pub content:     String,
  pub author_id:   UserId,
  pub author_name: String,
  pub category_id: CategoryId,
}

/// Input for [`ThreadRepository::update_thread`](crate::store::ThreadRepository::update_thread).
#[derive(Debug, Clone)]
pub struct ThreadEdit {
  pub id:          ThreadId,
  pub title:       String,
  pub content:     String,
  /// Replaces the current category; it does not add a second one.
  pub category_id: CategoryId,
}

// ─── Category ────────────────────────────────────────────────────────────────

/// Read-only reference data. Threads must point at an existing category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub id:            CategoryId,
  pub category_name: String,
  #[serde(skip_serializing, default)]
  pub created_at:    DateTime<Utc>,
  #[serde(skip_serializing, default)]
  pub updated_at:    DateTime<Utc>,
}

// ─── Star ────────────────────────────────────────────────────────────────────

/// A user's bookmark on a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
  pub user_id:    UserId,
  pub thread_id:  ThreadId,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Thread {
    let now = Utc::now();
    Thread {
      id:          7,
      title:       "Borrow checker".into(),
      content:     "Why does this not compile?".into(),
      author_id:   1,
      author_name: "ferris".into(),
      upvotes:     0,
      created_at:  now,
      updated_at:  now,
      is_solved:   false,
      categories:  BTreeMap::from([(3, "rust".to_string())]),
    }
  }

  #[test]
  fn categories_serialise_as_id_keyed_object() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["categories"], serde_json::json!({ "3": "rust" }));
    assert_eq!(json["upvotes"], 0);
  }

  #[test]
  fn category_id_is_serialised_next_to_the_map() {
    let mut thread = sample();
    assert_eq!(serde_json::to_value(&thread).unwrap()["category_id"], 3);
    thread.categories.clear();
    assert!(serde_json::to_value(&thread).unwrap()["category_id"].is_null());
  }

  #[test]
  fn serialised_thread_deserialises_back() {
    let thread = sample();
    let json = serde_json::to_string(&thread).unwrap();
    let back: Thread = serde_json::from_str(&json).unwrap();
    assert_eq!(back, thread);
  }

  #[test]
  fn category_id_reads_the_single_link() {
    let mut thread = sample();
    assert_eq!(thread.category_id(), Some(3));
    thread.categories.clear();
    assert_eq!(thread.category_id(), None);
  }

  #[test]
  fn category_timestamps_are_not_serialised() {
    let category = Category {
      id:            1,
      category_name: "general".into(),
      created_at:    Utc::now(),
      updated_at:    Utc::now(),
    };
    let json = serde_json::to_value(&category).unwrap();
    assert_eq!(json, serde_json::json!({ "id": 1, "category_name": "general" }));
  }
}
