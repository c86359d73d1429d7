//! User identity as persisted by the credential store.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// A registered user. Immutable once created.
///
/// `password_hash` is a PHC string; it is never serialised into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       UserId,
  pub username:      String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
}
