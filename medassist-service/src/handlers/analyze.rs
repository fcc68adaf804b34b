use super::upload::read_upload_form;
use super::NO_IMAGE_MESSAGE;
use crate::models::ImageQuery;
use crate::services::prompts::IMAGE_DIAGNOSIS_PROMPT;
use crate::services::providers::{with_deadline, GenerationRequest};
use crate::startup::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use service_core::error::AppError;

/// Optional free-text field sent with the image.
const SYMPTOMS_FIELD: &str = "symptoms";

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub diagnosis: String,
}

/// `POST /analyze`: a medical image plus optional symptoms, answered by the
/// generative provider. The diagnosis is passed through untouched.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| AppError::bad_request(NO_IMAGE_MESSAGE))?;

    let query = ImageQuery::new(
        image.bytes.clone(),
        image.content_type.as_deref(),
        form.field(SYMPTOMS_FIELD),
    );

    tracing::info!(
        image_bytes = query.image.len(),
        mime_type = %query.mime_type,
        "Image analysis requested"
    );

    let request = GenerationRequest::image(
        IMAGE_DIAGNOSIS_PROMPT,
        query.mime_type,
        query.image,
        query.user_prompt,
    );

    let raw = with_deadline(
        state.generative.generate(&request),
        state.config.provider_timeout,
        &state.shutdown,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Image analysis failed");
        AppError::UpstreamError(e.to_string())
    })?;

    // Image findings are returned exactly as the provider wrote them.
    Ok(Json(AnalyzeResponse { diagnosis: raw }))
}
