//! Request-scoped inputs. Nothing here outlives a single HTTP exchange.

use axum::body::Bytes;
use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

/// Placeholder sent to the provider when the caller gave no free-text prompt.
pub const EMPTY_USER_PROMPT: &str = "none";

/// Patient details for a text-only diagnosis.
///
/// Every field is trimmed on construction; only `medical_history` may be
/// blank.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PatientQuery {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub age: String,
    #[validate(length(min = 1))]
    pub gender: String,
    #[validate(length(min = 1))]
    pub symptoms: String,
    pub medical_history: String,
}

/// Raw `/diagnose` query string. Absent parameters deserialize as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientParams {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub symptoms: String,
    pub medical_history: String,
}

impl From<PatientParams> for PatientQuery {
    fn from(params: PatientParams) -> Self {
        Self {
            name: params.name.trim().to_string(),
            age: params.age.trim().to_string(),
            gender: params.gender.trim().to_string(),
            symptoms: params.symptoms.trim().to_string(),
            medical_history: params.medical_history.trim().to_string(),
        }
    }
}

/// An uploaded medical image plus whatever the user typed alongside it.
#[derive(Debug, Clone)]
pub struct ImageQuery {
    pub image: Bytes,
    pub mime_type: String,
    pub user_prompt: String,
}

impl ImageQuery {
    /// Falls back to `image/jpeg` when the upload carried no usable image
    /// content type.
    pub fn new(image: Bytes, mime_type: Option<&str>, user_prompt: Option<&str>) -> Self {
        let mime_type = mime_type
            .filter(|m| m.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();
        let user_prompt = match user_prompt.map(str::trim) {
            Some(prompt) if !prompt.is_empty() => prompt.to_string(),
            _ => EMPTY_USER_PROMPT.to_string(),
        };

        Self {
            image,
            mime_type,
            user_prompt,
        }
    }
}

/// A prescription photo that has already been written to the upload area.
#[derive(Debug, Clone)]
pub struct PrescriptionQuery {
    pub image_path: PathBuf,
}
