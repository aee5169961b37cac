//! Generative-text enrichment for the portal.
//!
//! [`GenAiClient`] talks to a Gemini-style `generateContent` endpoint and
//! implements [`portal_core::enrich::Enricher`]. Every failure is absorbed
//! into the documented fallback values, so callers never see an error from
//! enrichment.

mod client;
mod wire;

pub mod error;

pub use client::{GenAiClient, GenAiConfig};
pub use error::{Error, Result};
