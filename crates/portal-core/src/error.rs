//! Error types for `portal-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::policy::Action;

#[derive(Debug, Error)]
pub enum Error {
  /// The caller's role or scope does not permit the action.
  #[error("{caller} is not allowed to {action}")]
  Unauthorized { caller: String, action: Action },

  #[error("leave application {0} has already been decided")]
  AlreadyDecided(Uuid),

  #[error("unknown attendance status: {0:?}")]
  UnknownStatus(String),

  #[error("person not found: {0}")]
  PersonNotFound(String),

  #[error("leave application not found: {0}")]
  LeaveNotFound(Uuid),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  #[error("identifier already in use: {0}")]
  DuplicateId(String),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid {field}: {reason}")]
  InvalidValue { field: &'static str, reason: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// The caller lacked the role or scope for the action.
  pub fn is_authorization(&self) -> bool {
    matches!(self, Self::Unauthorized { .. })
  }

  /// The target was not in a state (or the input not in a set) that allows
  /// the requested transition.
  pub fn is_invalid_transition(&self) -> bool {
    matches!(self, Self::AlreadyDecided(_) | Self::UnknownStatus(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
