//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as `{"error": {"message": "..."}}`. Failed token
//! verification answers 403; everything else answers 400.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::response::envelope;

/// An error returned by an API handler or the access gate.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Malformed id, path or body.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// Missing or structurally malformed `Authorization` header.
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  /// The bearer token failed verification.
  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("invalid username or password")]
  Credentials,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Wrap a backend error, passing its message through unchanged.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      _ => StatusCode::BAD_REQUEST,
    }
  }

  fn message(&self) -> String {
    match self {
      ApiError::Validation(m)
      | ApiError::NotFound(m)
      | ApiError::Forbidden(m)
      | ApiError::Internal(m) => m.clone(),
      ApiError::Unauthorized(m) => (*m).to_owned(),
      ApiError::Credentials => self.to_string(),
      ApiError::Store(e) => e.to_string(),
    }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  message: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Store(e) => warn!(error = %e, "store failure"),
      ApiError::Internal(m) => warn!(error = %m, "internal failure"),
      other => debug!(error = %other, "request rejected"),
    }
    let body = ErrorBody { message: self.message() };
    (self.status(), envelope("error", body)).into_response()
  }
}
