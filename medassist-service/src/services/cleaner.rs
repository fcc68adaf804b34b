//! Post-processing for provider text.
//!
//! Emphasis pairs are matched lazily and never across a line break, so list
//! bullets (`* item`) and stray asterisks survive untouched.

use regex::Regex;
use std::sync::OnceLock;

struct CleanerPatterns {
    bold: Regex,
    italic: Regex,
    disclaimer: Regex,
}

static PATTERNS: OnceLock<CleanerPatterns> = OnceLock::new();

fn patterns() -> &'static CleanerPatterns {
    PATTERNS.get_or_init(|| CleanerPatterns {
        bold: Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"),
        italic: Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"),
        disclaimer: Regex::new(
            r"(?i)(?:\*\*Disclaimer:\*\*|Disclaimer:|I am an AI and .*? medical advice\.)",
        )
        .expect("disclaimer pattern is valid"),
    })
}

/// `**X**` → `X`, then `*X*` → `X`, then trim.
pub fn strip_markdown(text: &str) -> String {
    let patterns = patterns();

    let text = patterns.bold.replace_all(text, "${1}");
    let text = patterns.italic.replace_all(&text, "${1}");

    text.trim().to_string()
}

/// Removes `Disclaimer:` labels and "I am an AI and ... medical advice."
/// sentences, repeating until none remain (a removal can splice two halves
/// into a new match).
pub fn strip_disclaimers(text: &str) -> String {
    let disclaimer = &patterns().disclaimer;

    let mut text = text.to_string();
    while disclaimer.is_match(&text) {
        text = disclaimer.replace_all(&text, "").into_owned();
    }
    text
}

/// Full clean-up for the text-diagnosis path.
///
/// Disclaimers go first so a bold label is removed as one unit; the second
/// pass catches labels that only became visible once emphasis was stripped.
pub fn clean_diagnosis(text: &str) -> String {
    let text = strip_disclaimers(text);
    let text = strip_markdown(&text);
    strip_disclaimers(&text).trim().to_string()
}
