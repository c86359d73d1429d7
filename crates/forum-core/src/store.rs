//! Repository traits and the combined [`ForumStore`] bound.
//!
//! Traits are implemented by storage backends (e.g. `forum-store-sqlite`).
//! The API layer depends on these abstractions, not on any concrete backend.
//!
//! Every repository extends [`Backend`], which owns the single associated
//! error type, so a bound such as `S: ThreadRepository + ReplyRepository`
//! still has one unambiguous `S::Error`.

use std::future::Future;

use crate::{
  CategoryId, ReplyId, ThreadId, UserId,
  reply::{NewReply, Reply},
  thread::{Category, NewThread, Star, Thread, ThreadEdit},
  user::User,
};

/// Shared root of every repository trait.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Persists user identities. Hashing happens before the store is reached;
/// the store only ever sees the PHC string.
pub trait CredentialStore: Backend {
  /// Persist a new user. Fails with `DuplicateUsername` if the name is taken.
  fn insert_user<'a>(
    &'a self,
    username: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Look up a user by exact username. Returns `None` if not found.
  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;
}

// ─── Threads ─────────────────────────────────────────────────────────────────

/// Threads, their category link, and the category reference data.
pub trait ThreadRepository: Backend {
  /// Fetch one thread with its category map. Returns `None` if not found.
  fn get_thread(
    &self,
    id: ThreadId,
  ) -> impl Future<Output = Result<Option<Thread>, Self::Error>> + Send + '_;

  /// All threads, newest id first, optionally restricted to one category.
  fn list_threads(
    &self,
    category: Option<CategoryId>,
  ) -> impl Future<Output = Result<Vec<Thread>, Self::Error>> + Send + '_;

  /// Threads written by `author_id`, newest first.
  fn threads_by_author(
    &self,
    author_id: UserId,
  ) -> impl Future<Output = Result<Vec<Thread>, Self::Error>> + Send + '_;

  /// Threads starred by `user_id`, most recently starred first.
  fn starred_threads(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Thread>, Self::Error>> + Send + '_;

  /// Every category, ordered by id.
  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  /// Insert a thread and its single category link as one unit.
  ///
  /// Fails with `CategoryNotFound` and persists nothing if the category does
  /// not exist.
  fn insert_thread(
    &self,
    input: NewThread,
  ) -> impl Future<Output = Result<Thread, Self::Error>> + Send + '_;

  /// Replace title, content and category of an existing thread.
  ///
  /// Fails with `ThreadNotFound` or `CategoryNotFound`; either way nothing is
  /// written.
  fn update_thread(
    &self,
    edit: ThreadEdit,
  ) -> impl Future<Output = Result<Thread, Self::Error>> + Send + '_;

  /// Remove the thread's category link and then the thread row, atomically.
  /// Deleting an id that does not exist is not an error.
  fn delete_thread(
    &self,
    id: ThreadId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flip `is_solved` in a single statement and return the updated thread.
  fn toggle_solved(
    &self,
    id: ThreadId,
  ) -> impl Future<Output = Result<Thread, Self::Error>> + Send + '_;
}

// ─── Replies ─────────────────────────────────────────────────────────────────

pub trait ReplyRepository: Backend {
  /// Replies of a thread: answers first, then oldest first within each group.
  fn list_replies(
    &self,
    thread_id: ThreadId,
  ) -> impl Future<Output = Result<Vec<Reply>, Self::Error>> + Send + '_;

  /// Persist a reply with `is_answer = false`. Fails with `ThreadNotFound` if
  /// the parent thread does not exist.
  fn insert_reply(
    &self,
    input: NewReply,
  ) -> impl Future<Output = Result<Reply, Self::Error>> + Send + '_;

  /// Delete a reply. Deleting an id that does not exist is not an error.
  fn delete_reply(
    &self,
    id: ReplyId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flip `is_answer` in a single statement and return the updated reply.
  fn toggle_answer(
    &self,
    id: ReplyId,
  ) -> impl Future<Output = Result<Reply, Self::Error>> + Send + '_;
}

// ─── Stars ───────────────────────────────────────────────────────────────────

pub trait StarRepository: ThreadRepository {
  /// Record a bookmark. No existence or duplicate check is made.
  fn star(
    &self,
    user_id: UserId,
    thread_id: ThreadId,
  ) -> impl Future<Output = Result<Star, Self::Error>> + Send + '_;

  /// Remove every matching bookmark. Removing nothing is not an error.
  fn unstar(
    &self,
    user_id: UserId,
    thread_id: ThreadId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Threads bookmarked by `user_id`; see [`ThreadRepository::starred_threads`].
  fn list_starred(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Thread>, Self::Error>> + Send + '_ {
    self.starred_threads(user_id)
  }
}

// ─── Combined bound ──────────────────────────────────────────────────────────

/// Everything the API needs from a backend.
pub trait ForumStore:
  CredentialStore + ThreadRepository + ReplyRepository + StarRepository
{
}

impl<T> ForumStore for T where
  T: CredentialStore + ThreadRepository + ReplyRepository + StarRepository
{
}
