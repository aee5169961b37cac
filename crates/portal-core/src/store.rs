//! The `PortalStore` trait and the whole-collection load/save helpers.
//!
//! Every collection lives in one named slot as a single JSON document. A
//! mutation rewrites the whole slot; there is no partial update and no
//! conflict detection, so two writers against the same store overwrite each
//! other and the last save wins. Only one writer per store is supported.

use std::{collections::HashMap, future::Future, sync::Mutex};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// A named persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
  Users,
  Attendance,
  Leaves,
  Announcements,
  Complaints,
  Timetable,
  ClassTests,
  Academic,
}

impl Slot {
  /// The key under which the slot is stored.
  pub fn key(self) -> &'static str {
    match self {
      Slot::Users => "users",
      Slot::Attendance => "attendance",
      Slot::Leaves => "leaves",
      Slot::Announcements => "announcements",
      Slot::Complaints => "complaints",
      Slot::Timetable => "timetable",
      Slot::ClassTests => "class_tests",
      Slot::Academic => "academic",
    }
  }

  pub const ALL: [Slot; 8] = [
    Slot::Users,
    Slot::Attendance,
    Slot::Leaves,
    Slot::Announcements,
    Slot::Complaints,
    Slot::Timetable,
    Slot::ClassTests,
    Slot::Academic,
  ];
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a slot store backend.
///
/// Backends store and return raw JSON text; decoding, and recovery from
/// undecodable text, happen in [`load_slot`].
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The stored document for `slot`, or `None` if it was never written.
  fn read_slot(
    &self,
    slot: Slot,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Replace the stored document for `slot`.
  fn write_slot(
    &self,
    slot: Slot,
    json: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Load and decode a slot. A missing slot, a failing read or undecodable JSON
/// all yield `fallback()`; the latter two are logged. Never fails.
pub async fn load_slot<S, T>(store: &S, slot: Slot, fallback: impl FnOnce() -> T) -> T
where
  S: PortalStore,
  T: DeserializeOwned,
{
  match store.read_slot(slot).await {
    Ok(Some(json)) => match serde_json::from_str(&json) {
      Ok(value) => value,
      Err(e) => {
        tracing::warn!(slot = slot.key(), error = %e, "stored data is corrupt; using default");
        fallback()
      }
    },
    Ok(None) => {
      tracing::debug!(slot = slot.key(), "slot empty; using default");
      fallback()
    }
    Err(e) => {
      tracing::warn!(slot = slot.key(), error = %e, "failed to read slot; using default");
      fallback()
    }
  }
}

/// Encode and write a whole collection to its slot.
pub async fn save_slot<S, T>(store: &S, slot: Slot, value: &T) -> Result<()>
where
  S: PortalStore,
  T: Serialize + ?Sized,
{
  let json = serde_json::to_string(value)?;
  store
    .write_slot(slot, json)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  tracing::debug!(slot = slot.key(), "slot saved");
  Ok(())
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A [`PortalStore`] held in process memory. Useful for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
  slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Seed a slot with raw text, bypassing encoding.
  pub fn with_raw(self, slot: Slot, json: impl Into<String>) -> Self {
    self.put(slot, json.into());
    self
  }

  pub fn raw(&self, slot: Slot) -> Option<String> {
    self.lock().get(&slot).cloned()
  }

  fn put(&self, slot: Slot, json: String) { self.lock().insert(slot, json); }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Slot, String>> {
    // A poisoned map is still a valid map.
    self.slots.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl PortalStore for MemoryStore {
  type Error = std::convert::Infallible;

  async fn read_slot(&self, slot: Slot) -> Result<Option<String>, Self::Error> {
    Ok(self.raw(slot))
  }

  async fn write_slot(&self, slot: Slot, json: String) -> Result<(), Self::Error> {
    self.put(slot, json);
    Ok(())
  }
}
