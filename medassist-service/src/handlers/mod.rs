//! HTTP handlers for the medassist service.

pub mod analyze;
pub mod diagnose;
pub mod health;
pub mod prescription;
mod upload;

pub use analyze::analyze_image;
pub use diagnose::{diagnose, diagnose_preflight};
pub use health::health_check;
pub use prescription::analyze_prescription;

/// Returned when a multipart request has no usable `image` part.
pub const NO_IMAGE_MESSAGE: &str = "No image uploaded";

/// Unknown paths get the same `{"error": ...}` body as every other failure.
pub async fn not_found() -> service_core::error::AppError {
    service_core::error::AppError::NotFound("Not found".to_string())
}
