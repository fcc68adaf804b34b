//! OpenAI vision provider for prescription photos.
//!
//! The stored image is decoded, flattened to RGB, re-encoded as PNG and sent
//! as a base64 data URL next to a fixed instruction.

use super::{PrescriptionProvider, ProviderError};
use crate::services::prompts::PRESCRIPTION_PROMPT;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

pub struct OpenAiPrescriptionProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiPrescriptionProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn build_request(&self, image_data_url: String) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: PRESCRIPTION_PROMPT.to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url,
                        },
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl PrescriptionProvider for OpenAiPrescriptionProvider {
    async fn extract(&self, image_path: &Path) -> Result<String, ProviderError> {
        let raw = tokio::fs::read(image_path).await.map_err(|e| {
            ProviderError::InvalidImage(format!("cannot read {}: {}", image_path.display(), e))
        })?;

        // Decoding and PNG encoding are CPU-bound.
        let data_url = tokio::task::spawn_blocking(move || png_data_url(&raw))
            .await
            .map_err(|e| ProviderError::InvalidImage(format!("encoder task failed: {}", e)))??;

        tracing::debug!(
            model = %self.config.model,
            path = %image_path.display(),
            encoded_len = data_url.len(),
            "Sending prescription to OpenAI"
        );

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.api_base.trim_end_matches('/')
            ))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.build_request(data_url))
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_content(chat)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decodes any supported image format and re-encodes it as an RGB PNG data URL.
pub fn png_data_url(raw: &[u8]) -> Result<String, ProviderError> {
    let decoded =
        image::load_from_memory(raw).map_err(|e| ProviderError::InvalidImage(e.to_string()))?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut png = Cursor::new(Vec::new());
    rgb.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ProviderError::InvalidImage(format!("PNG encoding failed: {}", e)))?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png.into_inner())
    ))
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimited(message)
    } else {
        ProviderError::ApiError(format!("OpenAI API error {}: {}", status, message))
    }
}

fn extract_content(chat: ChatResponse) -> Result<String, ProviderError> {
    let choice = chat
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no choices returned".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(ProviderError::ContentFiltered(refusal));
    }

    choice
        .message
        .content
        .ok_or_else(|| ProviderError::InvalidResponse("choice contained no content".to_string()))
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
