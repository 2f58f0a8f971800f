//! # Prediction pipeline
//!
//! The single entry point used by every front end. One call runs
//!
//! ```text
//! Received -> Validated -> Triaged -> Classified -> Enriched -> Done
//!                 |            |
//!          RejectedInvalid  RejectedEmergency
//! ```
//!
//! and yields exactly one [`PredictionResult`]. Validation runs first. Emergency triage runs on
//! accepted input only and, when it matches, the model is never consulted.

use crate::advisory::{self, AdvisoryRecord, DoctorAdvice};
use crate::constants::{EMERGENCY_CONTACTS, EMERGENCY_MESSAGE};
use crate::emergency::matched_emergency_phrase;
use crate::engine::ClassificationEngine;
use crate::error::CoreResult;
use crate::text::normalize;
use crate::validation::{validate_symptoms, RejectionReason};
use serde::Serialize;
use symcheck_types::{ConfidenceTier, Severity};

/// Number of runner-up labels reported with a diagnosis.
const ALTERNATIVES: usize = 3;

/// Pipeline states. Only the last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Triaged,
    Classified,
    Enriched,
    Done,
    RejectedInvalid,
    RejectedEmergency,
}

/// A diagnosis with the guidance attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub label: String,
    /// Boosted display confidence; not a calibrated probability.
    pub confidence_percent: f64,
    pub confidence_tier: ConfidenceTier,
    pub severity: Severity,
    pub advisory: &'static AdvisoryRecord,
    pub doctor_advice: DoctorAdvice,
    /// Unboosted top probability.
    pub raw_probability: f64,
    /// Most probable labels, highest first, including the predicted one.
    pub alternatives: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    InvalidInput {
        reason: RejectionReason,
        message: &'static str,
    },
    Emergency {
        message: &'static str,
        matched_phrase: &'static str,
        contacts: &'static [(&'static str, &'static str)],
    },
    Diagnosis(Diagnosis),
}

impl PredictionResult {
    pub fn terminal_stage(&self) -> PipelineStage {
        match self {
            PredictionResult::InvalidInput { .. } => PipelineStage::RejectedInvalid,
            PredictionResult::Emergency { .. } => PipelineStage::RejectedEmergency,
            PredictionResult::Diagnosis(_) => PipelineStage::Done,
        }
    }
}

#[derive(Debug)]
pub struct PredictionPipeline {
    engine: ClassificationEngine,
}

impl PredictionPipeline {
    pub fn new(engine: ClassificationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ClassificationEngine {
        &self.engine
    }

    /// Runs one symptom description through the pipeline.
    ///
    /// Rejected and emergency inputs are results, not errors.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ModelNotReady` if the input reaches classification with no model
    /// installed.
    pub fn predict(&self, text: &str) -> CoreResult<PredictionResult> {
        tracing::trace!(stage = ?PipelineStage::Received, chars = text.chars().count());

        let validation = validate_symptoms(text);
        if let Some(reason) = validation.rejection {
            tracing::debug!(stage = ?PipelineStage::RejectedInvalid, ?reason);
            return Ok(PredictionResult::InvalidInput {
                reason,
                message: reason.message(),
            });
        }
        tracing::trace!(stage = ?PipelineStage::Validated, tokens = validation.token_count);

        if let Some(phrase) = matched_emergency_phrase(text) {
            tracing::debug!(stage = ?PipelineStage::RejectedEmergency, phrase);
            return Ok(PredictionResult::Emergency {
                message: EMERGENCY_MESSAGE,
                matched_phrase: phrase,
                contacts: EMERGENCY_CONTACTS,
            });
        }
        tracing::trace!(stage = ?PipelineStage::Triaged);

        let classification = self.engine.classify(&normalize(text))?;
        tracing::trace!(stage = ?PipelineStage::Classified, label = %classification.label);

        let advisory = advisory::lookup(&classification.label);
        let diagnosis = Diagnosis {
            confidence_percent: classification.confidence_percent,
            confidence_tier: ConfidenceTier::from_percent(classification.confidence_percent),
            severity: advisory.severity,
            advisory,
            doctor_advice: advisory::doctor_advice(advisory.severity),
            raw_probability: classification.probability,
            alternatives: classification
                .top(ALTERNATIVES)
                .into_iter()
                .map(|(label, p)| (label.to_string(), p))
                .collect(),
            label: classification.label,
        };
        tracing::debug!(
            stage = ?PipelineStage::Done,
            label = %diagnosis.label,
            confidence = diagnosis.confidence_percent
        );
        Ok(PredictionResult::Diagnosis(diagnosis))
    }
}
