//! The `Enricher` capability: best-effort text drafting and complaint
//! classification by an external service.
//!
//! Implementations never fail. When the service is unreachable or answers
//! with something unusable they return the documented fallback values, so
//! nothing in the core waits on, or breaks because of, enrichment.

use std::future::Future;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Returned by [`Enricher::draft_announcement`] when the service answers
/// with no text.
pub const DRAFT_EMPTY: &str = "Failed to generate announcement.";

/// Returned by [`Enricher::draft_announcement`] when the call fails.
pub const DRAFT_FAILED: &str = "Error generating content. Please try again.";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

/// Structured classification of a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintAnalysis {
  pub priority: Priority,
  /// One or two words.
  pub category: String,
  /// Five to ten words.
  pub summary:  String,
}

impl ComplaintAnalysis {
  /// Used whenever classification is unavailable.
  pub fn fallback() -> Self {
    Self {
      priority: Priority::Medium,
      category: "General".into(),
      summary:  "AI Analysis Failed".into(),
    }
  }
}

pub trait Enricher: Send + Sync {
  /// Draft a formal announcement about `topic`, or return [`DRAFT_EMPTY`] /
  /// [`DRAFT_FAILED`].
  fn draft_announcement<'a>(
    &'a self,
    topic: &'a str,
  ) -> impl Future<Output = String> + Send + 'a;

  /// Classify a complaint, or return [`ComplaintAnalysis::fallback`].
  fn classify_complaint<'a>(
    &'a self,
    description: &'a str,
  ) -> impl Future<Output = ComplaintAnalysis> + Send + 'a;
}

/// An enricher with no service behind it; always answers with the fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Enricher for Offline {
  async fn draft_announcement(&self, _topic: &str) -> String { DRAFT_FAILED.to_owned() }

  async fn classify_complaint(&self, _description: &str) -> ComplaintAnalysis {
    ComplaintAnalysis::fallback()
  }
}
