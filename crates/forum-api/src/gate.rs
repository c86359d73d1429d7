//! The access gate in front of privileged routes.
//!
//! The gate is a plain [`axum::middleware`] function, so any set of routes can
//! be wrapped with one `route_layer`. Which routes are wrapped is decided by
//! [`GateScope`].

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use forum_core::UserId;
use serde::Deserialize;
use tracing::debug;

use crate::{error::ApiError, token::TokenVerifier};

/// The verified caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// Which routes sit behind the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateScope {
  /// Only thread edit and thread delete.
  #[default]
  Admin,
  /// Every mutating route.
  AllWrites,
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The header must be exactly two space-separated parts with the literal
/// scheme `Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized("invalid auth header"))?;

  let (scheme, token) = value
    .split_once(' ')
    .filter(|(_, token)| !token.contains(' '))
    .ok_or(ApiError::Unauthorized("invalid auth header"))?;

  if scheme != "Bearer" {
    return Err(ApiError::Unauthorized("unauthorized - no bearer"));
  }
  Ok(token)
}

/// Check the header shape, then verify the token.
pub fn authorize(headers: &HeaderMap, verifier: &dyn TokenVerifier) -> Result<AuthUser, ApiError> {
  let token = bearer_token(headers)?;
  verifier
    .verify_token(token)
    .map(AuthUser)
    .map_err(|e| ApiError::Forbidden(e.to_string()))
}

pub async fn require_auth(
  State(verifier): State<Arc<dyn TokenVerifier>>,
  mut req: Request,
  next: Next,
) -> Response {
  let mut response = match authorize(req.headers(), verifier.as_ref()) {
    Ok(user) => {
      debug!(user_id = user.0, path = %req.uri().path(), "caller verified");
      req.extensions_mut().insert(user);
      next.run(req).await
    }
    Err(e) => e.into_response(),
  };
  response
    .headers_mut()
    .insert(header::VARY, HeaderValue::from_static("Authorization"));
  response
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
  };
  use tower::ServiceExt as _;

  use super::*;
  use crate::token::TokenError;

  /// Accepts the literal token "good" as user 9 and counts every call.
  #[derive(Default)]
  struct CountingVerifier {
    calls: AtomicUsize,
  }

  impl TokenVerifier for CountingVerifier {
    fn verify_token(&self, token: &str) -> Result<UserId, TokenError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if token == "good" { Ok(9) } else { Err(TokenError::Subject) }
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn missing_header_is_unauthorized() {
    let v = CountingVerifier::default();
    let err = authorize(&HeaderMap::new(), &v).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized("invalid auth header")));
    assert_eq!(v.calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn wrong_scheme_never_reaches_verifier() {
    let v = CountingVerifier::default();
    let err = authorize(&headers("Token abc"), &v).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized("unauthorized - no bearer")));
    assert_eq!(v.calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn wrong_part_count_never_reaches_verifier() {
    let v = CountingVerifier::default();
    for value in ["Bearer", "Bearer a b", "goodtoken"] {
      let err = authorize(&headers(value), &v).unwrap_err();
      assert!(matches!(err, ApiError::Unauthorized(_)), "{value:?}");
    }
    assert_eq!(v.calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn failed_verification_is_forbidden() {
    let v = CountingVerifier::default();
    let err = authorize(&headers("Bearer bad"), &v).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(v.calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn valid_token_yields_user() {
    let v = CountingVerifier::default();
    assert_eq!(authorize(&headers("Bearer good"), &v).unwrap(), AuthUser(9));
  }

  #[tokio::test]
  async fn middleware_attaches_user_to_request() {
    let verifier = Arc::new(CountingVerifier::default());
    let dyn_verifier: Arc<dyn TokenVerifier> = verifier.clone();
    let app = Router::new()
      .route(
        "/who",
        get(|Extension(AuthUser(id)): Extension<AuthUser>| async move { id.to_string() }),
      )
      .route_layer(middleware::from_fn_with_state(dyn_verifier, require_auth));

    let ok = app
      .clone()
      .oneshot(
        Request::builder()
          .uri("/who")
          .header("authorization", "Bearer good")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(ok.headers()[header::VARY], "Authorization");
    let body = axum::body::to_bytes(ok.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"9");

    let denied = app
      .oneshot(
        Request::builder()
          .uri("/who")
          .header("authorization", "Basic abc")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(denied.status(), StatusCode::BAD_REQUEST);
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
  }
}
