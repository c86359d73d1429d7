//! JSON HTTP API for the forum.
//!
//! Exposes an axum [`Router`] backed by any [`forum_core::store::ForumStore`].
//! Every response body is a single-key JSON envelope; see [`response`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(store, TokenService::new(secret.as_bytes()));
//! let app = forum_api::api_router(state, GateScope::Admin);
//! ```

pub mod auth;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod gate;
pub mod replies;
pub mod response;
pub mod stars;
pub mod threads;
pub mod token;


use std::sync::Arc;

use axum::{
  Router,
  http::{Method, header},
  middleware,
  response::IntoResponse,
  routing::{delete, get, post, put},
};
use forum_core::store::ForumStore;
use serde::Serialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

pub use error::ApiError;
pub use gate::{AuthUser, GateScope};
pub use token::{TokenService, TokenVerifier};

use crate::response::envelope;

/// Shared handler state.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenService>,
}

impl<S> AppState<S> {
  pub fn new(store: S, tokens: TokenService) -> Self {
    Self { store: Arc::new(store), tokens: Arc::new(tokens) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), tokens: Arc::clone(&self.tokens) }
  }
}

#[derive(Debug, Serialize)]
struct Status {
  status:  &'static str,
  version: &'static str,
}

/// `GET /status`
async fn status() -> impl IntoResponse {
  envelope("status", Status { status: "available", version: env!("CARGO_PKG_VERSION") })
}

fn cors() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the full API router.
///
/// Thread edit and delete are always behind the access gate; with
/// [`GateScope::AllWrites`] every other mutating route is too.
pub fn api_router<S>(state: AppState<S>, scope: GateScope) -> Router<()>
where
  S: ForumStore + 'static,
{
  let reads = Router::new()
    .route("/status", get(status))
    .route("/v1/signup", post(auth::sign_up::<S>))
    .route("/v1/signin", post(auth::sign_in::<S>))
    .route("/v1/thread/{id}", get(threads::get_one::<S>))
    .route("/v1/threads", get(threads::list::<S>))
    .route("/v1/threads/{category_id}", get(threads::list_by_category::<S>))
    .route("/v1/categories", get(threads::categories::<S>))
    .route("/v1/yourthreads/{author_id}", get(threads::by_author::<S>))
    .route("/v1/replies/{thread_id}", get(replies::list::<S>))
    .route("/v1/starred/{user_id}", get(stars::list::<S>));

  let writes = Router::new()
    .route("/v1/newthread", post(threads::create::<S>))
    .route("/v1/togglesolved/{id}", put(threads::toggle_solved::<S>))
    .route("/v1/newreply/{thread_id}", post(replies::create::<S>))
    .route("/v1/deletereply/{id}", get(replies::delete::<S>))
    .route("/v1/toggleanswer/{id}", put(replies::toggle_answer::<S>))
    .route("/v1/star/{user_id}/{thread_id}", post(stars::star::<S>))
    .route("/v1/unstar/{user_id}/{thread_id}", delete(stars::unstar::<S>));

  let admin = Router::new()
    .route("/v1/admin/editthread", post(threads::edit::<S>))
    .route("/v1/admin/deletethread/{id}", get(threads::delete::<S>));

  let (open, gated) = match scope {
    GateScope::Admin => (reads.merge(writes), admin),
    GateScope::AllWrites => (reads, admin.merge(writes)),
  };

  let verifier: Arc<dyn TokenVerifier> = state.tokens.clone();
  open
    .merge(gated.route_layer(middleware::from_fn_with_state(verifier, gate::require_auth)))
    .with_state(state)
    .layer(cors())
    .layer(TraceLayer::new_for_http())
}
