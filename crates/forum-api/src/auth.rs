//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/v1/signup` | Body: `{"username":..,"password":..}`; 201 |
//! | `POST` | `/v1/signin` | Same body; returns a bearer token |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use forum_core::{UserId, store::ForumStore};
use serde::{Deserialize, Serialize};

use crate::{
  AppState, credentials,
  error::ApiError,
  extract::JsonBody,
  response::envelope,
};

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
  pub user_id:  UserId,
  pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
  pub token:    String,
  pub user_id:  UserId,
  pub username: String,
}

/// `POST /v1/signup`
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let user =
    credentials::create_user(state.store.as_ref(), &body.username, &body.password).await?;
  Ok((
    StatusCode::CREATED,
    envelope("response", SignUpResponse { user_id: user.user_id, username: user.username }),
  ))
}

/// `POST /v1/signin`
pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let user =
    credentials::authenticate(state.store.as_ref(), &body.username, &body.password).await?;
  let token = state
    .tokens
    .issue(user.user_id)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  Ok(envelope("response", SignInResponse {
    token,
    user_id: user.user_id,
    username: user.username,
  }))
}
