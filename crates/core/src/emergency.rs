//! Keyword-based emergency triage.
//!
//! Input is only lowercased before matching, so phrases with punctuation such as "can't breathe"
//! still match.

use crate::constants::EMERGENCY_PHRASES;

/// Returns the first emergency phrase found in `text`, if any.
pub fn matched_emergency_phrase(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    EMERGENCY_PHRASES
        .iter()
        .copied()
        .find(|phrase| lowered.contains(phrase))
}

/// Returns true if `text` contains any emergency phrase.
pub fn is_emergency(text: &str) -> bool {
    matched_emergency_phrase(text).is_some()
}
