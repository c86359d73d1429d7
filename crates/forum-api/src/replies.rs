//! Handlers for replies.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/v1/replies/{thread_id}` | Answers first, then oldest first |
//! | `POST` | `/v1/newreply/{thread_id}` | Body: `{"content","author_id","author_name"}` |
//! | `GET`  | `/v1/deletereply/{id}` | |
//! | `PUT`  | `/v1/toggleanswer/{id}` | Returns the updated reply |

use axum::{extract::State, response::IntoResponse};
use forum_core::{
  ReplyId, ThreadId, UserId,
  reply::NewReply,
  store::{ForumStore, ReplyRepository as _},
};
use serde::Deserialize;
use tracing::info;

use crate::{
  AppState,
  error::ApiError,
  extract::{IdPath, JsonBody},
  response::{envelope, ok},
};

/// `GET /v1/replies/{thread_id}`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  IdPath(thread_id): IdPath<ThreadId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let replies = state.store.list_replies(thread_id).await.map_err(ApiError::store)?;
  Ok(envelope("replies", replies))
}

#[derive(Debug, Deserialize)]
pub struct NewReplyBody {
  pub content:     String,
  pub author_id:   UserId,
  pub author_name: String,
}

/// `POST /v1/newreply/{thread_id}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  IdPath(thread_id): IdPath<ThreadId>,
  JsonBody(body): JsonBody<NewReplyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let reply = state
    .store
    .insert_reply(NewReply {
      thread_id,
      content: body.content,
      author_id: body.author_id,
      author_name: body.author_name,
    })
    .await
    .map_err(ApiError::store)?;
  info!(reply_id = reply.id, thread_id, "reply created");
  Ok(ok())
}

/// `GET /v1/deletereply/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  IdPath(id): IdPath<ReplyId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  state.store.delete_reply(id).await.map_err(ApiError::store)?;
  Ok(ok())
}

/// `PUT /v1/toggleanswer/{id}`
pub async fn toggle_answer<S>(
  State(state): State<AppState<S>>,
  IdPath(id): IdPath<ReplyId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let reply = state.store.toggle_answer(id).await.map_err(ApiError::store)?;
  Ok(envelope("reply", reply))
}
