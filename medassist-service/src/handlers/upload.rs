use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use service_core::error::AppError;
use std::collections::HashMap;

/// Name of the multipart part holding the uploaded file.
pub const IMAGE_FIELD: &str = "image";

pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A drained multipart body: the image part, if any, and every text field.
#[derive(Default)]
pub struct UploadForm {
    pub image: Option<UploadedImage>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Reads the whole form. A body that is not multipart at all is treated as an
/// empty form so the caller reports a missing image rather than a framing
/// error.
pub async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, AppError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request body is not multipart");
            return Ok(UploadForm::default());
        }
    };

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;

            // An empty file input still sends a part; treat it as no upload.
            if !bytes.is_empty() && form.image.is_none() {
                form.image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes,
                });
            }
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::bad_request(format!("Failed to read multipart body: {}", err.body_text()))
    }
}
