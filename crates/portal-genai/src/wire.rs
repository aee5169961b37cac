//! Request and response bodies for `models/{model}:generateContent`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use portal_core::enrich::{ComplaintAnalysis, Priority};

use crate::{Error, Result};

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
  pub contents:          Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  pub response_mime_type: &'static str,
  pub response_schema:    Value,
}

impl GenerateRequest {
  /// A plain-text prompt.
  pub fn text(prompt: String) -> Self {
    Self {
      contents:          vec![Content { parts: vec![Part { text: Some(prompt) }] }],
      generation_config: None,
    }
  }

  /// A prompt whose answer must be JSON matching `schema`.
  pub fn structured(prompt: String, schema: Value) -> Self {
    Self {
      generation_config: Some(GenerationConfig {
        response_mime_type: "application/json",
        response_schema:    schema,
      }),
      ..Self::text(prompt)
    }
  }
}

/// Schema of a complaint classification.
pub fn complaint_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "priority": {
        "type": "STRING",
        "description": "Urgency level: Low, Medium, or High"
      },
      "category": {
        "type": "STRING",
        "description": "A brief 1-2 word category for the complaint"
      },
      "summary": {
        "type": "STRING",
        "description": "A 5-10 word summary of the core issue"
      }
    },
    "required": ["priority", "category", "summary"]
  })
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
  #[serde(default)]
  pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
  #[serde(default)]
  pub content: Option<Content>,
}

impl GenerateResponse {
  /// The first candidate's text parts, concatenated. Blank text is an
  /// [`Error::EmptyResponse`].
  pub fn into_text(self) -> Result<String> {
    let text: String = self
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
      .unwrap_or_default();
    if text.trim().is_empty() {
      return Err(Error::EmptyResponse);
    }
    Ok(text)
  }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
  priority: String,
  category: String,
  summary:  String,
}

/// Decode a classification. An unrecognised priority reads as the default.
pub fn parse_analysis(text: &str) -> Result<ComplaintAnalysis> {
  let raw: RawAnalysis = serde_json::from_str(text.trim())?;
  Ok(ComplaintAnalysis {
    priority: raw.priority.trim().parse().unwrap_or_else(|_| {
      tracing::debug!(priority = %raw.priority, "unrecognised priority");
      Priority::default()
    }),
    category: raw.category,
    summary:  raw.summary,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn structured_request_shape() {
    let body = serde_json::to_value(GenerateRequest::structured(
      "classify".into(),
      complaint_schema(),
    ))
    .unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "classify");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["required"][2], "summary");

    let plain = serde_json::to_value(GenerateRequest::text("hi".into())).unwrap();
    assert!(plain.get("generationConfig").is_none());
  }

  #[test]
  fn text_joins_first_candidate_parts() {
    let resp: GenerateResponse = serde_json::from_str(
      r#"{"candidates":[{"content":{"parts":[{"text":"Dear "},{"text":"students"}]}},
                        {"content":{"parts":[{"text":"ignored"}]}}]}"#,
    )
    .unwrap();
    assert_eq!(resp.into_text().unwrap(), "Dear students");
  }

  #[test]
  fn missing_text_is_empty_response() {
    for body in [r#"{}"#, r#"{"candidates":[{}]}"#, r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#] {
      let resp: GenerateResponse = serde_json::from_str(body).unwrap();
      assert!(matches!(resp.into_text(), Err(Error::EmptyResponse)));
    }
  }

  #[test]
  fn analysis_priority_is_lenient() {
    let a = parse_analysis(r#"{"priority":"high","category":"Hostel","summary":"Water outage in block B"}"#)
      .unwrap();
    assert_eq!(a.priority, Priority::High);
    assert_eq!(a.category, "Hostel");

    let b = parse_analysis(r#"{"priority":"urgent!","category":"X","summary":"Y"}"#).unwrap();
    assert_eq!(b.priority, Priority::Medium);

    assert!(parse_analysis("not json").is_err());
  }
}
