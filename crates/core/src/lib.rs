//! # SymCheck Core
//!
//! Core logic for the SymCheck symptom checker.
//!
//! This crate turns free-text symptom descriptions into one of three outcomes:
//! - an invalid-input rejection with a user-facing reason
//! - an emergency alert, for text matching a fixed list of critical phrases
//! - a diagnosis: a disease label from a TF-IDF + random forest model, with a display
//!   confidence and static advisory content
//!
//! It also owns the offline side: loading the training table, fitting and evaluating the model,
//! and persisting it as a versioned artifact.
//!
//! **No API concerns**: HTTP servers, CLIs and DTOs belong in `api-rest`, `api-shared` and `cli`.

pub mod advisory;
pub mod artifact;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod emergency;
pub mod engine;
pub mod error;
pub mod ml;
pub mod pipeline;
pub mod presets;
pub mod text;
pub mod training;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use artifact::{ArtifactPaths, ModelArtifact, ModelMetadata};
pub use config::CoreConfig;
pub use engine::{
    load_or_train, Classification, ClassificationEngine, ModelSummary, StartupOutcome, TextModel,
};
pub use error::{CoreError, CoreResult};
pub use pipeline::{Diagnosis, PipelineStage, PredictionPipeline, PredictionResult};
pub use training::{train_from_csv, train_model, TrainingParams};
pub use validation::{validate_symptoms, RejectionReason, ValidationOutcome};

pub use symcheck_types::{ConfidenceTier, NonEmptyText, Severity};
