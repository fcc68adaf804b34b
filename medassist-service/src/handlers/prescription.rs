use super::upload::read_upload_form;
use super::NO_IMAGE_MESSAGE;
use crate::models::PrescriptionQuery;
use crate::services::providers::{with_deadline, ProviderError};
use crate::startup::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct PrescriptionResponse {
    pub extracted_text: String,
}

/// `POST /prescriptionanalyze`: store the photo, then hand its path to the
/// prescription provider.
///
/// Provider failures are reported inside a 200 response as
/// `"Error processing prescription: ..."`, which existing clients display
/// as-is. An image that cannot be read or decoded is a 500.
pub async fn analyze_prescription(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| AppError::bad_request(NO_IMAGE_MESSAGE))?;

    let image_path = state
        .uploads
        .save(image.file_name.as_deref(), &image.bytes)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to store prescription upload");
            e
        })?;
    let query = PrescriptionQuery { image_path };

    tracing::info!(
        path = %query.image_path.display(),
        image_bytes = image.bytes.len(),
        "Prescription analysis requested"
    );

    let outcome = with_deadline(
        state.prescription.extract(&query.image_path),
        state.config.provider_timeout,
        &state.shutdown,
    )
    .await;

    if !state.config.uploads.retain {
        if let Err(e) = state.uploads.remove(&query.image_path).await {
            tracing::warn!(error = %e, path = %query.image_path.display(), "Failed to remove upload");
        }
    }

    let extracted_text = match outcome {
        Ok(text) => text,
        Err(e @ ProviderError::InvalidImage(_)) => {
            tracing::error!(error = %e, "Prescription image unusable");
            return Err(AppError::InternalError(anyhow::Error::new(e)));
        }
        Err(e) => {
            tracing::error!(error = %e, "Prescription provider failed");
            format!("Error processing prescription: {}", e)
        }
    };

    Ok(Json(PrescriptionResponse { extracted_text }))
}
