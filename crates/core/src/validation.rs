//! Input validation for free-text symptom descriptions.
//!
//! The validator is a recall-favouring keyword heuristic. A token counts as medical evidence when
//! it is a substring of a known symptom term *or* a known term is a substring of it, so short
//! tokens such as "ach" match many terms. That behaviour is relied on by existing callers and is
//! kept as is.

use crate::constants::{
    COMMON_SYMPTOM_WORDS, MAX_IGNORED_TOKEN_CHARS, MIN_MEDICAL_EVIDENCE, MIN_SYMPTOM_TEXT_CHARS,
    MIN_SYMPTOM_TOKENS, VALID_SYMPTOM_TERMS,
};
use crate::text::normalize;
use serde::Serialize;

/// Why a symptom description was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    TooShort,
    InsufficientMedicalTerms,
    TooFewSymptoms,
}

impl RejectionReason {
    /// Stable machine-readable name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::TooShort => "too_short",
            RejectionReason::InsufficientMedicalTerms => "insufficient_medical_terms",
            RejectionReason::TooFewSymptoms => "too_few_symptoms",
        }
    }

    /// Human-readable explanation shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::TooShort => {
                "Input too short. Please enter more details about your symptoms."
            }
            RejectionReason::InsufficientMedicalTerms => {
                "Please describe symptoms using medical terms, e.g. fever/cough/headache."
            }
            RejectionReason::TooFewSymptoms => {
                "Please provide at least 2 symptoms, e.g. 'fever, cough, body ache'."
            }
        }
    }
}

/// Result of validating one symptom description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub rejection: Option<RejectionReason>,
    /// Number of tokens longer than two characters. Zero when rejected before tokenization
    /// results matter (too short, insufficient medical terms).
    pub token_count: usize,
}

impl ValidationOutcome {
    fn accept(token_count: usize) -> Self {
        Self {
            accepted: true,
            rejection: None,
            token_count,
        }
    }

    fn reject(reason: RejectionReason, token_count: usize) -> Self {
        Self {
            accepted: false,
            rejection: Some(reason),
            token_count,
        }
    }

    pub fn reason(&self) -> &'static str {
        self.rejection
            .map(|r| r.message())
            .unwrap_or("Valid symptoms")
    }
}

/// Splits on commas, semicolons and whitespace, keeping tokens longer than two characters.
pub fn symptom_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| t.chars().count() > MAX_IGNORED_TOKEN_CHARS)
        .collect()
}

/// Counts medical evidence in already-normalized text.
///
/// Each token contributes at most once. Each common symptom word found anywhere in the text
/// adds one more, independently of the tokens.
pub fn medical_evidence(normalized: &str, tokens: &[&str]) -> usize {
    let from_tokens = tokens
        .iter()
        .filter(|token| {
            VALID_SYMPTOM_TERMS
                .iter()
                .any(|term| term.contains(*token) || token.contains(term))
        })
        .count();

    let from_common_words = COMMON_SYMPTOM_WORDS
        .iter()
        .filter(|word| normalized.contains(*word))
        .count();

    from_tokens + from_common_words
}

/// Decides whether `text` is an acceptable symptom description.
pub fn validate_symptoms(text: &str) -> ValidationOutcome {
    let normalized = normalize(text);

    if normalized.chars().count() < MIN_SYMPTOM_TEXT_CHARS {
        return ValidationOutcome::reject(RejectionReason::TooShort, 0);
    }

    let tokens = symptom_tokens(&normalized);

    if medical_evidence(&normalized, &tokens) < MIN_MEDICAL_EVIDENCE {
        return ValidationOutcome::reject(RejectionReason::InsufficientMedicalTerms, 0);
    }

    if tokens.len() < MIN_SYMPTOM_TOKENS {
        return ValidationOutcome::reject(RejectionReason::TooFewSymptoms, tokens.len());
    }

    ValidationOutcome::accept(tokens.len())
}
