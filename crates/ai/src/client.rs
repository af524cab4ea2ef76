//! Gemini HTTP client
//!
//! Thin wrapper over the hosted `generateContent` endpoint. Guide
//! generation pins a JSON response MIME type and low temperature; the
//! concierge path sends the turn history as alternating user/model
//! contents and leaves sampling at service defaults.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::backend::{GenerationBackend, Speaker, Turn};
use crate::config::AiConfig;
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate; empty when the service
    /// returned nothing usable (callers decide what empty means).
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Client for the hosted Gemini generation service
pub struct GeminiClient {
    http_client: reqwest::Client,
    config: AiConfig,
}

impl GeminiClient {
    /// Create a client, requiring a configured API key
    pub fn new(config: AiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    #[instrument(skip(self, request))]
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<String> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Generation request rejected");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body.text();
        debug!(chars = text.len(), "Generation response received");
        Ok(text)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(None, system_instruction)),
            contents: vec![Content::text(Some("user"), prompt)],
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: Some("application/json".to_string()),
            }),
        };
        self.generate_content(&request).await
    }

    async fn converse(&self, system_instruction: &str, turns: &[Turn]) -> Result<String> {
        let contents = turns
            .iter()
            .map(|turn| {
                let role = match turn.speaker {
                    Speaker::Guest => "user",
                    Speaker::Assistant => "model",
                };
                Content::text(Some(role), &turn.text)
            })
            .collect();

        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(None, system_instruction)),
            contents,
            generation_config: None,
        };
        self.generate_content(&request).await
    }

    fn backend_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = AiConfig::default();
        assert!(matches!(
            GeminiClient::new(config),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn test_endpoint_shape() {
        let config = AiConfig {
            api_key: "k".to_string(),
            base_url: "https://example.test/".to_string(),
            ..AiConfig::default()
        };
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            format!(
                "https://example.test/v1beta/models/{}:generateContent",
                crate::config::DEFAULT_MODEL
            )
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\""},{"text":":1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.text(), "{\"a\":1}");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.text(), "");
    }
}
