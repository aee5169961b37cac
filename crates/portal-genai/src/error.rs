//! Error type for `portal-genai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("service answered {0}")]
  Status(reqwest::StatusCode),

  /// The service answered successfully but with no text.
  #[error("empty response")]
  EmptyResponse,

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
