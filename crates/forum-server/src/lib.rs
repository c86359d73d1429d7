//! Startup wiring for the forum server: configuration, store and router.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context as _, ensure};
use axum::Router;
use forum_api::{AppState, GateScope, TokenService};
use forum_store_sqlite::{DEFAULT_TIMEOUT, SqliteStore};
use serde::Deserialize;
use tracing::info;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FORUM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// SQLite file, or `:memory:`. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// HMAC key for bearer tokens. Required.
  #[serde(default)]
  pub jwt_secret:       String,
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms: u64,
  /// Category names created at startup if missing.
  #[serde(default = "default_categories")]
  pub categories:       Vec<String>,
  #[serde(default)]
  pub gate_scope:       GateScope,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 4000 }
fn default_store_path() -> PathBuf { PathBuf::from("forum.db") }
fn default_store_timeout_ms() -> u64 {
  u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}
fn default_categories() -> Vec<String> {
  ["general", "help", "off-topic"].map(String::from).to_vec()
}

impl ServerConfig {
  /// Load `path` (optional) layered under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_source(config::File::from(path).required(false))
  }

  fn from_source<T>(file: T) -> anyhow::Result<Self>
  where
    T: config::Source + Send + Sync + 'static,
  {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(file)
      .add_source(
        config::Environment::with_prefix("FORUM")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("categories"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    ensure!(!cfg.jwt_secret.is_empty(), "jwt_secret must be set");
    Ok(cfg)
  }

  pub fn store_timeout(&self) -> Duration { Duration::from_millis(self.store_timeout_ms) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

/// Open the configured store and make sure the category list exists.
pub async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store = if cfg.store_path == Path::new(":memory:") {
    SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?
  } else {
    let path = expand_tilde(&cfg.store_path);
    SqliteStore::open(&path)
      .await
      .with_context(|| format!("failed to open store at {path:?}"))?
  };
  let store = store.with_timeout(cfg.store_timeout());

  let added = store
    .seed_categories(&cfg.categories)
    .await
    .context("failed to seed categories")?;
  info!(
    added,
    total = cfg.categories.len(),
    deadline = ?store.timeout(),
    "store ready"
  );
  Ok(store)
}

pub fn app(cfg: &ServerConfig, store: SqliteStore) -> Router {
  let tokens = TokenService::new(cfg.jwt_secret.as_bytes());
  forum_api::api_router(AppState::new(store, tokens), cfg.gate_scope)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{File, FileFormat};
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> anyhow::Result<ServerConfig> {
    ServerConfig::from_source(File::from_str(toml, FileFormat::Toml))
  }

  #[test]
  fn defaults_fill_everything_but_the_secret() {
    let cfg = parse(r#"jwt_secret = "s""#).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:4000");
    assert_eq!(cfg.store_path, PathBuf::from("forum.db"));
    assert_eq!(cfg.store_timeout(), Duration::from_secs(3));
    assert_eq!(cfg.categories, ["general", "help", "off-topic"]);
    assert_eq!(cfg.gate_scope, GateScope::Admin);
  }

  #[test]
  fn explicit_values_win() {
    let cfg = parse(
      r#"
        host = "0.0.0.0"
        port = 8080
        jwt_secret = "s"
        store_timeout_ms = 500
        categories = ["rust"]
        gate_scope = "all_writes"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.store_timeout(), Duration::from_millis(500));
    assert_eq!(cfg.categories, ["rust"]);
    assert_eq!(cfg.gate_scope, GateScope::AllWrites);
  }

  #[test]
  fn missing_secret_is_rejected() {
    assert!(parse("port = 1").is_err());
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/forum.db")), PathBuf::from(home).join("forum.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/forum.db")), PathBuf::from("/tmp/forum.db"));
  }

  #[tokio::test]
  async fn in_memory_server_seeds_and_serves() {
    let cfg = parse(
      r#"
        jwt_secret = "s"
        store_path = ":memory:"
        categories = ["a", "b"]
      "#,
    )
    .unwrap();
    let store = open_store(&cfg).await.unwrap();
    let resp = app(&cfg, store)
      .oneshot(Request::builder().uri("/v1/categories").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["categories"].as_array().unwrap().len(), 2);
  }
}
