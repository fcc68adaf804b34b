//! Mock provider implementations for testing.
//!
//! Each mock returns a canned outcome and remembers the last input it saw.

use super::{GenerationRequest, GenerativeProvider, PrescriptionProvider, ProviderError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Mock multimodal provider.
pub struct MockGenerativeProvider {
    outcome: Result<String, String>,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerativeProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            outcome: Ok(response.into()),
            last_request: Mutex::new(None),
        }
    }

    /// Every call fails with `ProviderError::ApiError(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerativeProvider for MockGenerativeProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        self.outcome.clone().map_err(ProviderError::ApiError)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Mock prescription provider.
pub struct MockPrescriptionProvider {
    outcome: Result<String, String>,
    last_path: Mutex<Option<PathBuf>>,
}

impl MockPrescriptionProvider {
    pub fn new(extracted_text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(extracted_text.into()),
            last_path: Mutex::new(None),
        }
    }

    /// Every call fails with `ProviderError::ApiError(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            last_path: Mutex::new(None),
        }
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PrescriptionProvider for MockPrescriptionProvider {
    async fn extract(&self, image_path: &Path) -> Result<String, ProviderError> {
        if !tokio::fs::try_exists(image_path).await.unwrap_or(false) {
            return Err(ProviderError::InvalidImage(format!(
                "{} does not exist",
                image_path.display()
            )));
        }

        *self
            .last_path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(image_path.to_path_buf());

        self.outcome.clone().map_err(ProviderError::ApiError)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
