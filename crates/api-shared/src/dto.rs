//! Request and response types exchanged over the wire.
//!
//! A prediction response carries a `kind` discriminator and exactly one populated payload field,
//! matching it.

use serde::{Deserialize, Serialize};
use symcheck_core::advisory::{
    AdvisoryRecord, DoctorAdvice, GENERAL_REMINDERS, MEDICAL_DISCLAIMER,
};
use symcheck_core::presets::{BAD_EXAMPLES, GOOD_EXAMPLES, INPUT_TIP, QUICK_FILL_PRESETS};
use symcheck_core::{Diagnosis, ModelSummary, PredictionResult};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub model_ready: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictReq {
    /// Free-text symptom description, e.g. "fever, cough, headache".
    pub symptoms: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictKind {
    InvalidInput,
    Emergency,
    Diagnosis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictRes {
    pub kind: PredictKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_input: Option<InvalidInputRes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<EmergencyRes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<DiagnosisRes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvalidInputRes {
    /// Machine-readable reason: `too_short`, `insufficient_medical_terms` or `too_few_symptoms`.
    pub reason: String,
    pub message: String,
    pub good_examples: Vec<String>,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContactRes {
    pub region: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyRes {
    pub message: String,
    pub matched_phrase: String,
    pub contacts: Vec<EmergencyContactRes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvisoryRes {
    pub description: String,
    pub severity: String,
    pub home_remedies: Vec<String>,
    pub natural_remedies: Vec<String>,
    pub otc_medicines: Vec<String>,
    pub prevention: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DoctorAdviceRes {
    pub headline: String,
    pub see_doctor_if: Vec<String>,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlternativeRes {
    pub disease: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReminderRes {
    pub heading: String,
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisRes {
    pub disease: String,
    /// Display confidence, boosted and not calibrated.
    pub confidence_percent: f64,
    pub confidence_tier: String,
    pub severity: String,
    pub raw_probability: f64,
    pub advisory: AdvisoryRes,
    pub doctor_advice: DoctorAdviceRes,
    pub alternatives: Vec<AlternativeRes>,
    pub reminders: Vec<ReminderRes>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PresetRes {
    pub name: String,
    pub symptoms: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BadExampleRes {
    pub symptoms: String,
    pub why: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExamplesRes {
    pub presets: Vec<PresetRes>,
    pub good: Vec<String>,
    pub bad: Vec<BadExampleRes>,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelInfoRes {
    pub trees: usize,
    pub vocabulary_size: usize,
    pub labels: Vec<String>,
    pub n_records: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Held-out accuracy in `[0, 1]`.
    pub accuracy: f64,
    pub oob_score: Option<f64>,
    /// RFC 3339 timestamp.
    pub trained_at: String,
    pub seed: u64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl From<&AdvisoryRecord> for AdvisoryRes {
    fn from(record: &AdvisoryRecord) -> Self {
        Self {
            description: record.description.into(),
            severity: record.severity.to_string(),
            home_remedies: strings(record.home_remedies),
            natural_remedies: strings(record.natural_remedies),
            otc_medicines: strings(record.otc_medicines),
            prevention: strings(record.prevention),
        }
    }
}

impl From<&DoctorAdvice> for DoctorAdviceRes {
    fn from(advice: &DoctorAdvice) -> Self {
        Self {
            headline: advice.headline.into(),
            see_doctor_if: strings(advice.see_doctor_if),
            action: advice.action.into(),
        }
    }
}

impl From<&Diagnosis> for DiagnosisRes {
    fn from(diagnosis: &Diagnosis) -> Self {
        Self {
            disease: diagnosis.label.clone(),
            confidence_percent: diagnosis.confidence_percent,
            confidence_tier: diagnosis.confidence_tier.to_string(),
            severity: diagnosis.severity.to_string(),
            raw_probability: diagnosis.raw_probability,
            advisory: diagnosis.advisory.into(),
            doctor_advice: (&diagnosis.doctor_advice).into(),
            alternatives: diagnosis
                .alternatives
                .iter()
                .map(|(disease, probability)| AlternativeRes {
                    disease: disease.clone(),
                    probability: *probability,
                })
                .collect(),
            reminders: GENERAL_REMINDERS
                .iter()
                .map(|(heading, points)| ReminderRes {
                    heading: heading.to_string(),
                    points: strings(points),
                })
                .collect(),
            disclaimer: MEDICAL_DISCLAIMER.into(),
        }
    }
}

impl From<&PredictionResult> for PredictRes {
    fn from(result: &PredictionResult) -> Self {
        let empty = |kind| PredictRes {
            kind,
            invalid_input: None,
            emergency: None,
            diagnosis: None,
        };
        match result {
            PredictionResult::InvalidInput { reason, message } => PredictRes {
                invalid_input: Some(InvalidInputRes {
                    reason: reason.as_str().into(),
                    message: message.to_string(),
                    good_examples: strings(GOOD_EXAMPLES),
                    tip: INPUT_TIP.into(),
                }),
                ..empty(PredictKind::InvalidInput)
            },
            PredictionResult::Emergency {
                message,
                matched_phrase,
                contacts,
            } => PredictRes {
                emergency: Some(EmergencyRes {
                    message: message.to_string(),
                    matched_phrase: matched_phrase.to_string(),
                    contacts: contacts
                        .iter()
                        .map(|(region, number)| EmergencyContactRes {
                            region: region.to_string(),
                            number: number.to_string(),
                        })
                        .collect(),
                }),
                ..empty(PredictKind::Emergency)
            },
            PredictionResult::Diagnosis(diagnosis) => PredictRes {
                diagnosis: Some(diagnosis.into()),
                ..empty(PredictKind::Diagnosis)
            },
        }
    }
}

impl From<&ModelSummary> for ModelInfoRes {
    fn from(summary: &ModelSummary) -> Self {
        let meta = &summary.metadata;
        Self {
            trees: summary.trees,
            vocabulary_size: summary.vocabulary_size,
            labels: summary.labels.clone(),
            n_records: meta.n_records,
            n_train: meta.n_train,
            n_test: meta.n_test,
            accuracy: meta.accuracy,
            oob_score: meta.oob_score,
            trained_at: meta.trained_at.to_rfc3339(),
            seed: meta.seed,
        }
    }
}

impl ExamplesRes {
    /// The fixed presets and input examples.
    pub fn standard() -> Self {
        Self {
            presets: QUICK_FILL_PRESETS
                .iter()
                .map(|p| PresetRes {
                    name: p.name.into(),
                    symptoms: p.symptoms.into(),
                })
                .collect(),
            good: strings(GOOD_EXAMPLES),
            bad: BAD_EXAMPLES
                .iter()
                .map(|(symptoms, why)| BadExampleRes {
                    symptoms: symptoms.to_string(),
                    why: why.to_string(),
                })
                .collect(),
            tip: INPUT_TIP.into(),
        }
    }
}
