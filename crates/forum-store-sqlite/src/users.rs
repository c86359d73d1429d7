//! [`CredentialStore`] for [`SqliteStore`].

use forum_core::{store::CredentialStore, user::User};
use rusqlite::{ErrorCode, OptionalExtension as _};

use crate::{Result, SqliteStore};

impl CredentialStore for SqliteStore {
  async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
    let name = username.to_owned();
    let hash = password_hash.to_owned();

    let user_id: Option<i64> = self
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (username, password) VALUES (?1, ?2)",
          rusqlite::params![name, hash],
        ) {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let user_id = user_id
      .ok_or_else(|| forum_core::Error::DuplicateUsername(username.to_owned()))?;

    Ok(User {
      user_id,
      username: username.to_owned(),
      password_hash: password_hash.to_owned(),
    })
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    self
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password FROM users WHERE username = ?1",
              rusqlite::params![name],
              |row| {
                Ok(User {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
  }
}
