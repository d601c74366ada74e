//! Server configuration, layered from `config.toml` and `KIN_`-prefixed
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Sent to Wikidata on every request; add contact info when deploying.
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
  /// Delay between upstream fetches, in milliseconds.
  #[serde(default = "default_delay_ms")]
  pub delay_ms:   u64,
  /// Default crawl expansion depth.
  #[serde(default = "default_max_depth")]
  pub max_depth:  u32,
  /// Search results per page.
  #[serde(default = "default_page_size")]
  pub page_size:  usize,
}

impl ServerConfig {
  /// Load from `path` (optional) with `KIN_*` environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("KIN"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  5280
}

fn default_store_path() -> PathBuf {
  PathBuf::from("kin.db")
}

fn default_user_agent() -> String {
  concat!("kin/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_delay_ms() -> u64 {
  1000
}

fn default_max_depth() -> u32 {
  2
}

fn default_page_size() -> usize {
  10
}
