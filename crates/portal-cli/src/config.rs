//! Process configuration: an optional TOML file layered under `PORTAL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use portal_core::clock::DEFAULT_UTC_OFFSET_MINUTES;
use portal_genai::GenAiConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
  /// SQLite file holding every collection. `~` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Minutes east of UTC used for "today".
  #[serde(default = "default_utc_offset_minutes")]
  pub utc_offset_minutes: i32,
  /// Text generation service. Enrichment falls back to fixed values when
  /// this table is absent.
  #[serde(default)]
  pub genai:              Option<GenAiConfig>,
}

fn default_store_path() -> PathBuf { PathBuf::from("portal.db") }
fn default_utc_offset_minutes() -> i32 { DEFAULT_UTC_OFFSET_MINUTES }

impl PortalConfig {
  /// Read `path` if it exists, then apply `PORTAL_*` overrides.
  /// Nested keys use a double underscore, e.g. `PORTAL_GENAI__API_KEY`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PORTAL").separator("__"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: PortalConfig = settings
      .try_deserialize()
      .context("failed to deserialise PortalConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
