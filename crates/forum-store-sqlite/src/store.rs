//! [`SqliteStore`]: connection handling, per-call deadline, seeding.

use std::{
  path::Path,
  time::{Duration, Instant},
};

use forum_core::store::Backend;
use tracing::{debug, info};

use crate::{
  Error, Result,
  encode::{encode_dt, now},
  schema::SCHEMA,
};

/// Deadline applied to every store call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// How long the caller keeps waiting past the deadline for a result that was
/// produced in time to arrive from the connection thread.
const DELIVERY_GRACE: Duration = Duration::from_millis(100);

// ─── Deadline ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("store deadline passed")]
struct Expired;

/// The instant a store call stops being allowed to touch the database.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Instant);

impl Deadline {
  /// Fails once the deadline has passed. Transactions check this right
  /// before `commit`, so a late write rolls back.
  pub(crate) fn check(self) -> tokio_rusqlite::Result<()> {
    if Instant::now() >= self.0 {
      Err(tokio_rusqlite::Error::Other(Box::new(Expired)))
    } else {
      Ok(())
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The forum repositories backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  timeout: Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn, timeout: DEFAULT_TIMEOUT };
    store.init_schema().await?;
    info!(path = %path.display(), "store opened");
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, timeout: DEFAULT_TIMEOUT };
    store.init_schema().await?;
    Ok(store)
  }

  /// Replace the per-call deadline.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn timeout(&self) -> Duration { self.timeout }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Insert any of `names` that are not already categories.
  ///
  /// Returns the number of categories created.
  pub async fn seed_categories(&self, names: &[String]) -> Result<usize> {
    let names = names.to_vec();
    let at = encode_dt(now());

    let created = self
      .call_with_deadline(move |conn, deadline| {
        let tx = conn.transaction()?;
        let mut created = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO categories (category_name, created_at, updated_at)
             VALUES (?1, ?2, ?2)",
          )?;
          for name in &names {
            created += stmt.execute(rusqlite::params![name, at])?;
          }
        }
        deadline.check()?;
        tx.commit()?;
        Ok(created)
      })
      .await?;

    debug!(created, "categories seeded");
    Ok(created)
  }

  /// Run `function` on the connection thread, failing with
  /// [`Error::Timeout`] once the store deadline passes.
  pub(crate) async fn call<F, R>(&self, function: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self.call_with_deadline(move |conn, _| function(conn)).await
  }

  /// Like [`call`](Self::call), also handing the [`Deadline`] to `function`.
  ///
  /// The deadline covers queueing behind other calls as well as execution. A
  /// closure that reaches the connection after the deadline never touches
  /// it, so a call that fails with [`Error::Timeout`] has written nothing.
  pub(crate) async fn call_with_deadline<F, R>(&self, function: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection, Deadline) -> tokio_rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    let deadline = Deadline(Instant::now() + self.timeout);
    let guarded = move |conn: &mut rusqlite::Connection| {
      deadline.check()?;
      function(conn, deadline)
    };

    match tokio::time::timeout(self.timeout + DELIVERY_GRACE, self.conn.call(guarded)).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(tokio_rusqlite::Error::Other(e))) if e.is::<Expired>() => {
        Err(Error::Timeout(self.timeout))
      }
      Ok(Err(e)) => Err(e.into()),
      Err(_) => Err(Error::Timeout(self.timeout)),
    }
  }
}

impl Backend for SqliteStore {
  type Error = Error;
}
