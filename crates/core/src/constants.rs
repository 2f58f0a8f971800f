//! Constants used throughout the SymCheck core crate.
//!
//! Term lists, emergency phrases, default file names and model hyperparameter defaults live here
//! so the validator, detector and trainer all read from one place.

/// Known symptom terms used as medical evidence during input validation.
///
/// Matching against these is substring-based in both directions, see [`crate::validation`].
pub const VALID_SYMPTOM_TERMS: &[&str] = &[
    "fever",
    "cough",
    "headache",
    "fatigue",
    "pain",
    "ache",
    "nausea",
    "vomiting",
    "diarrhea",
    "constipation",
    "dizziness",
    "weakness",
    "chills",
    "sweating",
    "shortness of breath",
    "wheezing",
    "congestion",
    "runny nose",
    "sneezing",
    "sore throat",
    "difficulty breathing",
    "mucus",
    "phlegm",
    "chest tightness",
    "stomach pain",
    "abdominal pain",
    "bloating",
    "cramps",
    "heartburn",
    "severe headache",
    "migraine",
    "throbbing",
    "sensitivity to light",
    "body ache",
    "muscle pain",
    "joint pain",
    "stiffness",
    "swelling",
    "rash",
    "itching",
    "red skin",
    "dry skin",
    "blisters",
    "frequent urination",
    "burning urination",
    "painful urination",
    "anxiety",
    "depression",
    "sadness",
    "worry",
    "insomnia",
];

/// Common symptom words counted once each when they appear anywhere in the normalized text.
pub const COMMON_SYMPTOM_WORDS: &[&str] = &[
    "pain", "ache", "fever", "cough", "headache", "sore", "burning", "swelling", "itching",
];

/// Phrases that short-circuit classification. Order is significant only for reporting the first
/// match.
pub const EMERGENCY_PHRASES: &[&str] = &[
    "chest pain",
    "severe chest pain",
    "crushing chest pain",
    "can't breathe",
    "difficulty breathing severe",
    "unable to breathe",
    "unconscious",
    "loss of consciousness",
    "passing out",
    "severe bleeding",
    "heavy bleeding",
    "bleeding profusely",
    "stroke",
    "face drooping",
    "arm weakness",
    "slurred speech",
    "seizure",
    "convulsions",
    "heart attack",
    "coughing blood",
];

/// Fixed alert returned for emergency input.
pub const EMERGENCY_MESSAGE: &str = "CRITICAL CONDITION - SEEK IMMEDIATE MEDICAL ATTENTION";

/// Emergency numbers shown alongside the alert, as (region, number).
pub const EMERGENCY_CONTACTS: &[(&str, &str)] = &[("India", "108"), ("US", "911"), ("UK", "999")];

/// Minimum normalized length accepted by the validator.
pub const MIN_SYMPTOM_TEXT_CHARS: usize = 5;

/// Tokens this short or shorter are ignored by the validator.
pub const MAX_IGNORED_TOKEN_CHARS: usize = 2;

/// Minimum medical-evidence count and symptom token count for acceptance.
pub const MIN_MEDICAL_EVIDENCE: usize = 2;
pub const MIN_SYMPTOM_TOKENS: usize = 2;

/// Default directory holding the model artifact pair.
pub const DEFAULT_MODEL_DIR: &str = "model";

/// Default training table.
pub const DEFAULT_DATASET_PATH: &str = "dataset_improved.csv";

/// Filenames of the two artifact halves.
pub const VECTORIZER_FILENAME: &str = "vectorizer.json";
pub const CLASSIFIER_FILENAME: &str = "classifier.json";

/// Version embedded in every artifact file. Bump when the serialized layout changes.
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Dataset column names.
pub const SYMPTOMS_COLUMN: &str = "symptoms";
pub const DISEASE_COLUMN: &str = "disease";

/// Default training seed.
pub const DEFAULT_SEED: u64 = 42;

/// Held-out fraction for the stratified split.
pub const DEFAULT_TEST_FRACTION: f64 = 0.15;
