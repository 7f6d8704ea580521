use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{ChatError, ImageAttachment};

/// Thin client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: Client,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ChatError> {
        if !config.is_chat_configured() {
            return Err(ChatError::NotConfigured);
        }

        Ok(Self {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            http_client: Client::new(),
        })
    }

    /// One single-turn generation. Returns the reply text as the model wrote it.
    pub async fn generate(
        &self,
        system_prompt: &str,
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String, ChatError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = build_request(system_prompt, message, image);

        debug!("Calling {} model {}", self.base_url, self.model);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ChatError::Provider(format!("status {}", status)));
        }

        let ai_response: Value = response.json().await?;
        extract_text(&ai_response).ok_or_else(|| {
            error!("Gemini response had no text candidate: {}", ai_response);
            ChatError::Provider("empty response".to_string())
        })
    }
}

pub fn build_request(system_prompt: &str, message: &str, image: Option<&ImageAttachment>) -> Value {
    let mut parts = Vec::new();
    if !message.trim().is_empty() {
        parts.push(json!({ "text": message.trim() }));
    }
    if let Some(image) = image {
        parts.push(json!({
            "inline_data": {
                "mime_type": image.mime_type,
                "data": image.data.trim()
            }
        }));
    }

    json!({
        "systemInstruction": {
            "parts": [{ "text": system_prompt }]
        },
        "contents": [{
            "role": "user",
            "parts": parts
        }]
    })
}

/// Text of the first candidate, all parts joined.
pub fn extract_text(response: &Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
