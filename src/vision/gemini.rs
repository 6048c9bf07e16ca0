use super::{prompt, VisionBackend};
use crate::config_loader::Settings;
use crate::error::{NarrationError, Result};
use crate::record::PlantRecord;
use base64::Engine;
use config::ConfigError;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const BACKEND: &str = "gemini";

/// Google Gemini multimodal backend using the `generateContent` REST call.
pub struct GeminiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiBackend {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        max_output_tokens: u32,
        temperature: f32,
        timeout: Duration,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key: api_key.to_string(),
            max_output_tokens,
            temperature,
        })
    }

    pub fn from_settings(settings: &Settings) -> std::result::Result<Self, ConfigError> {
        if settings.vlm_api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "vlm_api_key is required for the gemini backend".to_string(),
            ));
        }
        Self::new(
            &settings.vlm_url,
            &settings.vlm_model,
            &settings.vlm_api_key,
            settings.vlm_max_output_tokens,
            settings.vlm_temperature,
            settings.request_timeout(),
        )
        .map_err(|e| ConfigError::Message(format!("Failed to build Gemini client: {}", e)))
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| body.trim().chars().take(200).collect())
    }
}

impl VisionBackend for GeminiBackend {
    fn id(&self) -> &'static str {
        BACKEND
    }

    fn generate_narration(&self, record: &PlantRecord, language: &str) -> Result<String> {
        // Decode first so a broken photo never costs a request
        let image = record.image.load()?;
        let prompt = prompt::build(record, language);

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": base64::engine::general_purpose::STANDARD.encode(&image.bytes)
                        }
                    }
                ]
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature
            }
        });

        debug!(
            endpoint = %self.endpoint,
            image_bytes = image.bytes.len(),
            mime_type = image.mime_type,
            "Gemini: sending narration request"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| NarrationError::from_http(BACKEND, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| NarrationError::from_http(BACKEND, e))?;

        if !status.is_success() {
            return Err(NarrationError::from_status(
                BACKEND,
                status.as_u16(),
                Self::error_message(&text),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| NarrationError::Backend {
                backend: BACKEND,
                status: status.as_u16(),
                message: format!("malformed response: {}", e),
            })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(reason, "Gemini: prompt was blocked");
            return Err(NarrationError::Backend {
                backend: BACKEND,
                status: status.as_u16(),
                message: format!("prompt blocked: {}", reason),
            });
        }

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Err(NarrationError::EmptyResponse { backend: BACKEND });
        };

        match candidate.finish_reason.as_deref() {
            Some("STOP") | None => {}
            Some("MAX_TOKENS") => warn!(
                max_output_tokens = self.max_output_tokens,
                "Gemini: narration was cut off at the output token limit"
            ),
            Some(reason) => warn!(reason, "Gemini: generation ended early"),
        }

        let narration = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let narration = narration.trim();
        if narration.is_empty() {
            return Err(NarrationError::EmptyResponse { backend: BACKEND });
        }

        Ok(narration.to_string())
    }
}
