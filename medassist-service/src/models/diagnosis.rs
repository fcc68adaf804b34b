use crate::services::cleaner;

/// Provider output alongside the version returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisResult {
    pub raw_text: String,
    pub cleaned_text: String,
}

impl DiagnosisResult {
    /// Text diagnosis: disclaimers removed, then emphasis markers stripped.
    pub fn from_text_diagnosis(raw_text: String) -> Self {
        let cleaned_text = cleaner::clean_diagnosis(&raw_text);
        Self {
            raw_text,
            cleaned_text,
        }
    }
}
