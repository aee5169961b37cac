//! [`SqliteStore`]: the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use portal_core::store::{PortalStore, Slot};

use crate::{Error, Result, schema::SCHEMA};

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// When `slot` was last written, if ever.
  pub async fn updated_at(&self, slot: Slot) -> Result<Option<DateTime<Utc>>> {
    let name = slot.key();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT updated_at FROM slots WHERE name = ?1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    raw.as_deref().map(decode_dt).transpose()
  }
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  async fn read_slot(&self, slot: Slot) -> Result<Option<String>> {
    let name = slot.key();
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json FROM slots WHERE name = ?1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn write_slot(&self, slot: Slot, json: String) -> Result<()> {
    let name = slot.key();
    let at_str = encode_dt(Utc::now());
    let bytes = json.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO slots (name, value_json, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(name) DO UPDATE SET
             value_json = excluded.value_json,
             updated_at = excluded.updated_at",
          rusqlite::params![name, json, at_str],
        )?;
        Ok(())
      })
      .await?;
    tracing::trace!(slot = name, bytes, "slot written");
    Ok(())
  }
}
