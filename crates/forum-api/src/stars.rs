//! Handlers for stars (per-user thread bookmarks).

use axum::{extract::State, response::IntoResponse};
use forum_core::{
  ThreadId, UserId,
  store::{ForumStore, StarRepository as _},
};

use crate::{
  AppState,
  error::ApiError,
  extract::IdPath,
  response::{envelope, ok},
};

/// `POST /v1/star/{user_id}/{thread_id}`
pub async fn star<S>(
  State(state): State<AppState<S>>,
  IdPath((user_id, thread_id)): IdPath<(UserId, ThreadId)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  state.store.star(user_id, thread_id).await.map_err(ApiError::store)?;
  Ok(ok())
}

/// `DELETE /v1/unstar/{user_id}/{thread_id}`
pub async fn unstar<S>(
  State(state): State<AppState<S>>,
  IdPath((user_id, thread_id)): IdPath<(UserId, ThreadId)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  state.store.unstar(user_id, thread_id).await.map_err(ApiError::store)?;
  Ok(ok())
}

/// `GET /v1/starred/{user_id}`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  IdPath(user_id): IdPath<UserId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let threads = state.store.list_starred(user_id).await.map_err(ApiError::store)?;
  Ok(envelope("threads", threads))
}
