//! AI provider abstractions and implementations.
//!
//! Two capabilities, each behind its own trait so handlers can be exercised
//! against the mocks:
//! - [`GenerativeProvider`]: text and inline images in, text out (Gemini).
//! - [`PrescriptionProvider`]: a stored image file in, extracted text out
//!   (OpenAI vision chat).
//!
//! Calls are single-shot. Nothing here retries.

pub mod gemini;
pub mod mock;
pub mod openai;

use async_trait::async_trait;
use axum::body::Bytes;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The input could not be read or decoded before any call was made.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Provider call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Provider call cancelled")]
    Cancelled,
}

/// One piece of a multimodal prompt, in the order the provider should see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPart {
    Text(String),
    Image { mime_type: String, data: Bytes },
}

/// Ordered prompt parts for a [`GenerativeProvider`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub parts: Vec<InputPart>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![InputPart::Text(prompt.into())],
        }
    }

    /// Instruction, then the image, then the user's own words.
    pub fn image(
        instruction: impl Into<String>,
        mime_type: impl Into<String>,
        data: Bytes,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            parts: vec![
                InputPart::Text(instruction.into()),
                InputPart::Image {
                    mime_type: mime_type.into(),
                    data,
                },
                InputPart::Text(user_prompt.into()),
            ],
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            InputPart::Text(text) => Some(text.as_str()),
            InputPart::Image { .. } => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, InputPart::Image { .. }))
            .count()
    }
}

/// Trait for multimodal generation providers (e.g., Gemini).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate a text response for the given parts.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Trait for prescription extraction providers (e.g., OpenAI vision).
#[async_trait]
pub trait PrescriptionProvider: Send + Sync {
    /// Read the image at `image_path` and return the corrected prescription text.
    async fn extract(&self, image_path: &Path) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Runs a provider call under a deadline, abandoning it if `cancel` fires
/// first. The inner future is dropped in both cases.
pub async fn with_deadline<T, F>(
    call: F,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = tokio::time::timeout(timeout, call) => match result {
            Ok(inner) => inner,
            Err(_) => Err(ProviderError::Timeout(timeout)),
        },
    }
}
