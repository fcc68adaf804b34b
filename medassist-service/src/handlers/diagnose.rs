use crate::models::{DiagnosisResult, PatientParams, PatientQuery};
use crate::services::prompts::text_diagnosis_prompt;
use crate::services::providers::{with_deadline, GenerationRequest};
use crate::startup::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

pub const MISSING_PARAMETERS_MESSAGE: &str = "Missing required parameters";

/// Echo of the patient fields plus the cleaned diagnosis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseResponse {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub symptoms: String,
    pub medical_history: String,
    pub diagnosis: String,
}

/// `GET /diagnose?name=&age=&gender=&symptoms=[&medicalHistory=]`
pub async fn diagnose(
    State(state): State<AppState>,
    params: Result<Query<PatientParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A query string that cannot be read (e.g. a repeated field) is reported
    // the same way as a missing parameter.
    let Query(params) = params.map_err(|rejection| {
        tracing::info!(error = %rejection, "Unreadable diagnosis query");
        AppError::bad_request(MISSING_PARAMETERS_MESSAGE)
    })?;
    let patient = PatientQuery::from(params);
    if let Err(errors) = patient.validate() {
        tracing::info!(fields = ?errors.field_errors().keys().collect::<Vec<_>>(), "Rejected diagnosis request");
        return Err(AppError::bad_request(MISSING_PARAMETERS_MESSAGE));
    }

    let request = GenerationRequest::text(text_diagnosis_prompt(&patient));

    let raw = with_deadline(
        state.generative.generate(&request),
        state.config.provider_timeout,
        &state.shutdown,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Text diagnosis failed");
        AppError::UpstreamError(e.to_string())
    })?;

    let result = DiagnosisResult::from_text_diagnosis(raw);

    Ok(Json(DiagnoseResponse {
        name: patient.name,
        age: patient.age,
        gender: patient.gender,
        symptoms: patient.symptoms,
        medical_history: patient.medical_history,
        diagnosis: result.cleaned_text,
    }))
}

/// `OPTIONS /diagnose`: acknowledged with a message, and usable as a browser
/// preflight since it carries the same permissive CORS headers as every
/// other route.
pub async fn diagnose_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET,OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
        ],
        Json(json!({ "message": "CORS Preflight Passed" })),
    )
}
