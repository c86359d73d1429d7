//! Handlers for threads and categories.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/v1/thread/{id}` | |
//! | `GET`  | `/v1/threads` | Newest first |
//! | `GET`  | `/v1/threads/{category_id}` | |
//! | `GET`  | `/v1/categories` | |
//! | `GET`  | `/v1/yourthreads/{author_id}` | |
//! | `POST` | `/v1/newthread` | |
//! | `POST` | `/v1/admin/editthread` | Gated |
//! | `GET`  | `/v1/admin/deletethread/{id}` | Gated |
//! | `PUT`  | `/v1/togglesolved/{id}` | Returns the updated thread |

use axum::{Extension, extract::State, response::IntoResponse};
use forum_core::{
  CategoryId, ThreadId, UserId,
  store::{ForumStore, ThreadRepository as _},
  thread::{NewThread, ThreadEdit},
};
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::{
  AppState,
  error::ApiError,
  extract::{IdPath, JsonBody},
  gate::AuthUser,
  response::{envelope, ok},
};

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /v1/thread/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  IdPath(id): IdPath<ThreadId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let thread = state
    .store
    .get_thread(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("thread not found: {id}")))?;
  Ok(envelope("thread", thread))
}

/// `GET /v1/threads`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let threads = state.store.list_threads(None).await.map_err(ApiError::store)?;
  Ok(envelope("threads", threads))
}

/// `GET /v1/threads/{category_id}`
pub async fn list_by_category<S>(
  State(state): State<AppState<S>>,
  IdPath(category_id): IdPath<CategoryId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let threads = state
    .store
    .list_threads(Some(category_id))
    .await
    .map_err(ApiError::store)?;
  Ok(envelope("threads", threads))
}

/// `GET /v1/yourthreads/{author_id}`
pub async fn by_author<S>(
  State(state): State<AppState<S>>,
  IdPath(author_id): IdPath<UserId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let threads = state
    .store
    .threads_by_author(author_id)
    .await
    .map_err(ApiError::store)?;
  Ok(envelope("threads", threads))
}

/// `GET /v1/categories`
pub async fn categories<S>(State(state): State<AppState<S>>) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let categories = state.store.list_categories().await.map_err(ApiError::store)?;
  Ok(envelope("categories", categories))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewThreadBody {
  pub title:       String,
  pub content:     String,
  pub author_id:   UserId,
  pub author_name: String,
  pub category:    CategoryId,
}

/// `POST /v1/newthread`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<NewThreadBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let thread = state
    .store
    .insert_thread(NewThread {
      title:       body.title,
      content:     body.content,
      author_id:   body.author_id,
      author_name: body.author_name,
      category_id: body.category,
    })
    .await
    .map_err(ApiError::store)?;
  info!(thread_id = thread.id, category_id = body.category, "thread created");
  Ok(ok())
}

#[derive(Debug, Deserialize)]
pub struct EditThreadBody {
  #[serde(deserialize_with = "id_from_string_or_number")]
  pub id:       ThreadId,
  pub title:    String,
  pub content:  String,
  pub category: CategoryId,
}

/// Web clients send the thread id as a string; accept either form.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<ThreadId, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Repr {
    Number(ThreadId),
    Text(String),
  }

  match Repr::deserialize(deserializer)? {
    Repr::Number(id) => Ok(id),
    Repr::Text(s) => s
      .trim()
      .parse()
      .map_err(|_| serde::de::Error::custom(format!("invalid thread id: {s:?}"))),
  }
}

/// `POST /v1/admin/editthread`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  Extension(caller): Extension<AuthUser>,
  JsonBody(body): JsonBody<EditThreadBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  state
    .store
    .update_thread(ThreadEdit {
      id:          body.id,
      title:       body.title,
      content:     body.content,
      category_id: body.category,
    })
    .await
    .map_err(ApiError::store)?;
  info!(thread_id = body.id, caller = caller.0, "thread edited");
  Ok(ok())
}

/// `GET /v1/admin/deletethread/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Extension(caller): Extension<AuthUser>,
  IdPath(id): IdPath<ThreadId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  state.store.delete_thread(id).await.map_err(ApiError::store)?;
  info!(thread_id = id, caller = caller.0, "thread deleted");
  Ok(ok())
}

/// `PUT /v1/togglesolved/{id}`
pub async fn toggle_solved<S>(
  State(state): State<AppState<S>>,
  IdPath(id): IdPath<ThreadId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let thread = state.store.toggle_solved(id).await.map_err(ApiError::store)?;
  Ok(envelope("thread", thread))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn edit_id_accepts_string_or_number() {
    let from_text: EditThreadBody = serde_json::from_str(
      r#"{"id":"12","title":"t","content":"c","category":1}"#,
    )
    .unwrap();
    let from_number: EditThreadBody = serde_json::from_str(
      r#"{"id":12,"title":"t","content":"c","category":1}"#,
    )
    .unwrap();
    assert_eq!(from_text.id, 12);
    assert_eq!(from_number.id, 12);
  }

  #[test]
  fn edit_id_rejects_non_numeric_text() {
    let result = serde_json::from_str::<EditThreadBody>(
      r#"{"id":"twelve","title":"t","content":"c","category":1}"#,
    );
    assert!(result.is_err());
  }
}
