use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use super::{DraftBackend, DraftError, DraftRequest, GeneratedDraft};
use crate::config::AppConfig;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Generative Language `generateContent` client asking for a JSON
/// `{subject, body}` object.
pub struct GeminiBackend {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, api_base: &str, model: &str) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            api_base.trim_end_matches('/'),
            model
        ))
        .with_context(|| format!("invalid Gemini endpoint for base {api_base}"))?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>> {
        match config.gemini_api_key.as_deref() {
            Some(key) => Self::new(key, &config.gemini_api_base, &config.gemini_model).map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DraftBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(
        &self,
        request: &DraftRequest,
        prompt: &str,
    ) -> Result<GeneratedDraft, DraftError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(&request.system_prompt, prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DraftError::Api { status, body });
        }

        let payload: Value = response.json().await?;
        parse_response(&payload)
    }
}

fn request_body(system_prompt: &str, prompt: &str) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": system_prompt }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "subject": {
                        "type": "STRING",
                        "description": "A compelling subject line for the email thread."
                    },
                    "body": {
                        "type": "STRING",
                        "description": "The personalized body of the email/message."
                    }
                },
                "required": ["subject", "body"]
            }
        }
    })
}

pub(crate) fn parse_response(payload: &Value) -> Result<GeneratedDraft, DraftError> {
    let text = payload["candidates"][0]["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect::<String>();

    let trimmed = strip_code_fence(text.trim());
    if trimmed.is_empty() {
        return Err(DraftError::MissingContent);
    }

    Ok(serde_json::from_str(trimmed)?)
}

fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}
