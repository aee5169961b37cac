//! Async HTTP client for a Gemini-style text generation API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use portal_core::enrich::{
  ComplaintAnalysis, DRAFT_EMPTY, DRAFT_FAILED, Enricher,
};

use crate::{
  Error, Result,
  wire::{GenerateRequest, GenerateResponse, complaint_schema, parse_analysis},
};

/// Connection settings for the generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct GenAiConfig {
  #[serde(default = "default_endpoint")]
  pub endpoint:     String,
  #[serde(default = "default_model")]
  pub model:        String,
  pub api_key:      String,
  /// Named in announcement prompts.
  #[serde(default = "default_institution")]
  pub institution:  String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_endpoint() -> String { "https://generativelanguage.googleapis.com".into() }
fn default_model() -> String { "gemini-3-flash-preview".into() }
fn default_institution() -> String { "Kasur Institute of Allied Health Sciences".into() }
fn default_timeout_secs() -> u64 { 30 }

impl GenAiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      endpoint:     default_endpoint(),
      model:        default_model(),
      api_key:      api_key.into(),
      institution:  default_institution(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GenAiClient {
  client: Client,
  config: GenAiConfig,
}

impl GenAiClient {
  pub fn new(config: GenAiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.endpoint.trim_end_matches('/'),
      self.config.model
    )
  }

  /// `POST /v1beta/models/{model}:generateContent`
  async fn generate(&self, request: &GenerateRequest) -> Result<String> {
    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", &self.config.api_key)
      .json(request)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    let body: GenerateResponse = resp.json().await?;
    body.into_text()
  }

  /// Draft announcement text, surfacing any failure.
  pub async fn try_draft(&self, topic: &str) -> Result<String> {
    let prompt = format!(
      "Write a professional, formal announcement for {} regarding: \"{topic}\". \
       Keep it concise, polite, and authoritative. Use clear formatting.",
      self.config.institution
    );
    self.generate(&GenerateRequest::text(prompt)).await
  }

  /// Classify a complaint, surfacing any failure.
  pub async fn try_classify(&self, description: &str) -> Result<ComplaintAnalysis> {
    let prompt = format!(
      "Analyze the following complaint from a student or staff member:\n\"{description}\""
    );
    let text = self
      .generate(&GenerateRequest::structured(prompt, complaint_schema()))
      .await?;
    parse_analysis(&text)
  }
}

impl Enricher for GenAiClient {
  async fn draft_announcement(&self, topic: &str) -> String {
    match self.try_draft(topic).await {
      Ok(text) => text,
      Err(Error::EmptyResponse) => {
        tracing::warn!("announcement draft came back empty");
        DRAFT_EMPTY.to_owned()
      }
      Err(e) => {
        tracing::warn!(error = %e, "announcement draft failed");
        DRAFT_FAILED.to_owned()
      }
    }
  }

  async fn classify_complaint(&self, description: &str) -> ComplaintAnalysis {
    self.try_classify(description).await.unwrap_or_else(|e| {
      tracing::warn!(error = %e, "complaint classification failed");
      ComplaintAnalysis::fallback()
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// A client pointed at a closed local port, so every call fails fast
  /// without leaving the machine.
  fn unreachable() -> GenAiClient {
    GenAiClient::new(GenAiConfig {
      endpoint: "http://127.0.0.1:9".into(),
      timeout_secs: 2,
      ..GenAiConfig::new("test-key")
    })
    .unwrap()
  }

  #[test]
  fn url_includes_model() {
    let client = GenAiClient::new(GenAiConfig {
      endpoint: "https://example.test/".into(),
      model: "m1".into(),
      ..GenAiConfig::new("k")
    })
    .unwrap();
    assert_eq!(client.url(), "https://example.test/v1beta/models/m1:generateContent");
  }

  #[test]
  fn config_defaults_from_partial_table() {
    let cfg: GenAiConfig = serde_json::from_str(r#"{"api_key":"abc"}"#).unwrap();
    assert_eq!(cfg.model, "gemini-3-flash-preview");
    assert_eq!(cfg.timeout_secs, 30);
  }

  #[tokio::test]
  async fn unreachable_service_yields_fallbacks() {
    let client = unreachable();
    assert_eq!(client.draft_announcement("Sports Day").await, DRAFT_FAILED);
    assert_eq!(
      client.classify_complaint("The lab is flooded").await,
      ComplaintAnalysis::fallback()
    );
    assert!(matches!(client.try_draft("x").await, Err(Error::Http(_))));
  }
}
