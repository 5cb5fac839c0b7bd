//! Runtime configuration for the `tally` binary.
//!
//! Loaded from a TOML file (default `tally.toml`) with `TALLY_`-prefixed
//! environment variables layered on top, e.g. `TALLY_STORE__BACKEND=csv`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tally_core::event::DEFAULT_MILESTONE_INTERVAL;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default)]
  pub store:              StoreConfig,
  /// Holiday dates (ISO `YYYY-MM-DD`) treated as non-business days.
  #[serde(default)]
  pub holidays:           Vec<String>,
  /// Total-attendance interval at which a milestone event fires.
  #[serde(default = "default_milestone_interval")]
  pub milestone_interval: u32,
}

fn default_milestone_interval() -> u32 { DEFAULT_MILESTONE_INTERVAL }

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store:              StoreConfig::default(),
      holidays:           Vec::new(),
      milestone_interval: DEFAULT_MILESTONE_INTERVAL,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub backend:     StoreBackend,
  /// Database file used when `backend = "sqlite"`.
  pub sqlite_path: PathBuf,
  /// Data directory used when `backend = "csv"`.
  pub csv_root:    PathBuf,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend:     StoreBackend::Sqlite,
      sqlite_path: PathBuf::from("tally.db"),
      csv_root:    PathBuf::from("tally-data"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  Sqlite,
  Csv,
}

/// Load configuration from `path` (optional) plus the environment.
pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("TALLY").separator("__"))
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialise configuration")
}
