//! Generative-text client.
//!
//! Sends article prompts to the Gemini `generateContent` endpoint and
//! extracts the generated text from the nested response shape. Failures are
//! retried a fixed number of times with a short backoff, rotating the API
//! key between attempts so a rate-limited key does not stall the batch.

use crate::{credentials::KeyRing, log};
use serde::{Deserialize, Serialize};
use std::{thread, time::Duration};
use thiserror::Error;

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Request timeout. Long articles stream slowly; anything beyond this is
/// treated as a failed attempt.
const REQUEST_TIMEOUT_SECS: u64 = 40;

/// Default number of attempts per prompt
const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Fixed pause between attempts
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Generation client errors
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no valid API key available")]
    NoApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation endpoint returned an unexpected response shape")]
    InvalidResponse,
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    #[serde(rename = "topK")]
    pub top_k: u32,
    #[serde(rename = "topP")]
    pub top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_k: 30,
            top_p: 0.9,
            max_output_tokens: 5120,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Blocking client for the generation endpoint.
///
/// Owns the key ring so rotation stays coupled to the retry loop.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    keys: KeyRing,
    model: String,
    params: GenerationParams,
    max_attempts: u32,
    backoff: Duration,
}

impl GeminiClient {
    pub fn new(keys: KeyRing) -> Result<Self, GenerateError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("karang/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            keys,
            model: DEFAULT_MODEL.to_owned(),
            params: GenerationParams::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: RETRY_BACKOFF,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Generate text for a prompt.
    ///
    /// Retries with backoff on transport errors and malformed responses,
    /// rotating the key between attempts. Returns the last error once
    /// attempts are exhausted.
    pub fn generate(&mut self, prompt: &str) -> Result<String, GenerateError> {
        let mut last_error = GenerateError::InvalidResponse;

        for attempt in 1..=self.max_attempts {
            let key = self.keys.current_key().ok_or(GenerateError::NoApiKey)?;
            match self.request_once(key, prompt) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    log!("gemini"; "attempt {attempt}/{} failed: {err}", self.max_attempts);
                    last_error = err;
                }
            }

            self.keys.rotate();
            if attempt < self.max_attempts {
                thread::sleep(self.backoff);
            }
        }

        Err(last_error)
    }

    fn request_once(&self, key: &str, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{API_BASE}/{}:generateContent?key={key}", self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.params.clone(),
        };

        let response = self.http.post(&url).json(&body).send()?.error_for_status()?;
        let parsed: GenerateResponse = response.json()?;

        extract_text(&parsed).ok_or(GenerateError::InvalidResponse)
    }
}

/// Pull the generated text out of `candidates[0].content.parts[0].text`.
fn extract_text(response: &GenerateResponse) -> Option<String> {
    let text = response
        .candidates
        .first()?
        .content
        .parts
        .first()?
        .text
        .trim();
    (!text.is_empty()).then(|| text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_wire_names() {
        let value = serde_json::to_value(GenerationParams::default()).unwrap();
        assert_eq!(value["temperature"], serde_json::json!(0.6));
        assert_eq!(value["topK"], serde_json::json!(30));
        assert_eq!(value["topP"], serde_json::json!(0.9));
        assert_eq!(value["maxOutputTokens"], serde_json::json!(5120));
    }

    #[test]
    fn test_extract_text_from_nested_shape() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  generated article  "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&response).unwrap(), "generated article");
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_text(&response).is_none());
    }

    #[test]
    fn test_extract_text_empty_parts() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert!(extract_text(&response).is_none());
    }

    #[test]
    fn test_extract_text_blank_text() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#)
                .unwrap();
        assert!(extract_text(&response).is_none());
    }

    #[test]
    fn test_generate_without_keys() {
        let mut client = GeminiClient::new(KeyRing::default()).unwrap();
        let result = client.generate("prompt");
        assert!(matches!(result, Err(GenerateError::NoApiKey)));
    }

    #[test]
    fn test_builder_clamps_attempts() {
        let client = GeminiClient::new(KeyRing::default())
            .unwrap()
            .with_max_attempts(0);
        assert_eq!(client.max_attempts, 1);
    }
}
