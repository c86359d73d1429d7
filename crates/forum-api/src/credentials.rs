//! Account creation and sign-in.
//!
//! Passwords are stored as argon2 PHC strings. Hashing runs on the blocking
//! pool so it never stalls the request executor.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use forum_core::{store::CredentialStore, user::User};
use rand_core::OsRng;
use tracing::info;

use crate::error::ApiError;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("error hashing password: {e}")))
}

/// `false` for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
    .is_ok()
}

fn validate(username: &str, password: &str) -> Result<(), ApiError> {
  if username.trim().is_empty() {
    return Err(ApiError::Validation("username must not be empty".into()));
  }
  if password.is_empty() {
    return Err(ApiError::Validation("password must not be empty".into()));
  }
  Ok(())
}

async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Register a new account. Duplicate usernames surface as a store error.
pub async fn create_user<S: CredentialStore>(
  store: &S,
  username: &str,
  password: &str,
) -> Result<User, ApiError> {
  validate(username, password)?;
  let password = password.to_owned();
  let hash = blocking(move || hash_password(&password)).await??;
  let user = store
    .insert_user(username, &hash)
    .await
    .map_err(ApiError::store)?;
  info!(user_id = user.user_id, username = %user.username, "user created");
  Ok(user)
}

/// Check a username/password pair. Every failure yields the same error.
pub async fn authenticate<S: CredentialStore>(
  store: &S,
  username: &str,
  password: &str,
) -> Result<User, ApiError> {
  let Some(user) = store
    .find_user_by_username(username)
    .await
    .map_err(ApiError::store)?
  else {
    return Err(ApiError::Credentials);
  };

  let password = password.to_owned();
  let phc = user.password_hash.clone();
  if blocking(move || verify_password(&password, &phc)).await? {
    Ok(user)
  } else {
    Err(ApiError::Credentials)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use forum_store_sqlite::SqliteStore;

  #[test]
  fn hash_is_salted_and_verifiable() {
    let a = hash_password("hunter2").unwrap();
    let b = hash_password("hunter2").unwrap();
    assert_ne!(a, b);
    assert!(!a.contains("hunter2"));
    assert!(verify_password("hunter2", &a));
    assert!(!verify_password("hunter3", &a));
    assert!(!verify_password("hunter2", "not-a-phc-string"));
  }

  #[tokio::test]
  async fn create_then_authenticate() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let user = create_user(&store, "alice", "pw").await.unwrap();
    assert_ne!(user.password_hash, "pw");

    let signed_in = authenticate(&store, "alice", "pw").await.unwrap();
    assert_eq!(signed_in.user_id, user.user_id);
  }

  #[tokio::test]
  async fn wrong_password_and_unknown_user_look_the_same() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    create_user(&store, "alice", "pw").await.unwrap();

    let wrong = authenticate(&store, "alice", "nope").await.unwrap_err();
    let unknown = authenticate(&store, "bob", "pw").await.unwrap_err();
    assert!(matches!(wrong, ApiError::Credentials));
    assert!(matches!(unknown, ApiError::Credentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
  }

  #[tokio::test]
  async fn duplicate_username_is_rejected() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    create_user(&store, "alice", "pw").await.unwrap();
    let err = create_user(&store, "alice", "other").await.unwrap_err();
    assert!(matches!(err, ApiError::Store(_)));
  }

  #[tokio::test]
  async fn empty_credentials_are_rejected() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    assert!(matches!(
      create_user(&store, " ", "pw").await,
      Err(ApiError::Validation(_))
    ));
    assert!(matches!(
      create_user(&store, "alice", "").await,
      Err(ApiError::Validation(_))
    ));
  }
}
