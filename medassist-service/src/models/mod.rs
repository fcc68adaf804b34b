pub mod diagnosis;
pub mod query;

pub use diagnosis::DiagnosisResult;
pub use query::{ImageQuery, PatientParams, PatientQuery, PrescriptionQuery, EMPTY_USER_PROMPT};
