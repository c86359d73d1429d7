//! Extractors whose rejections use the JSON error envelope.
//!
//! Route parameters arrive as typed values; a non-numeric id never reaches a
//! handler.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Path, Request},
  http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Typed path parameters, e.g. `IdPath<i64>` or `IdPath<(i64, i64)>`.
#[derive(Debug)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    Path::<T>::from_request_parts(parts, state)
      .await
      .map(|Path(value)| IdPath(value))
      .map_err(|e| ApiError::Validation(e.body_text()))
  }
}

/// A JSON request body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    Json::<T>::from_request(req, state)
      .await
      .map(|Json(value)| JsonBody(value))
      .map_err(|e| ApiError::Validation(e.body_text()))
  }
}
