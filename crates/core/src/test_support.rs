//! Shared fixtures for unit tests: a small labelled corpus and a model trained on it once.

use crate::artifact::ModelArtifact;
use crate::dataset::TrainingRecord;
use crate::engine::ClassificationEngine;
use crate::ml::ForestParams;
use crate::training::{train_model, TrainingParams};
use std::sync::LazyLock;

const FIXTURE: &[(&str, &[&str])] = &[
    (
        "Flu (Influenza)",
        &[
            "fever, dry cough, body ache, fatigue",
            "high fever, chills, body ache, headache",
            "fever, cough, fatigue, muscle pain",
            "sudden fever, dry cough, chills, weakness",
            "fever, body ache, headache, fatigue",
            "high fever, dry cough, muscle pain, chills",
            "fever, chills, fatigue, body ache, cough",
            "dry cough, high fever, weakness, headache",
        ],
    ),
    (
        "Common Cold",
        &[
            "runny nose, sneezing, sore throat",
            "sneezing, nasal congestion, runny nose",
            "sore throat, runny nose, mild cough",
            "nasal congestion, sneezing, sore throat",
            "runny nose, sneezing, watery eyes",
            "mild cough, runny nose, nasal congestion",
            "sore throat, sneezing, watery eyes",
            "runny nose, sore throat, nasal congestion, sneezing",
        ],
    ),
    (
        "Migraine",
        &[
            "severe headache, nausea, sensitivity to light",
            "throbbing headache, sensitivity to light, vomiting",
            "severe headache, throbbing pain, nausea",
            "sensitivity to light, throbbing headache, dizziness",
            "one sided headache, nausea, sensitivity to light",
            "severe headache, vomiting, sensitivity to sound",
            "throbbing pain, nausea, sensitivity to sound",
            "severe headache, dizziness, throbbing pain",
        ],
    ),
    (
        "Gastroenteritis",
        &[
            "diarrhea, vomiting, stomach pain",
            "stomach cramps, diarrhea, nausea",
            "vomiting, diarrhea, abdominal pain, mild fever",
            "watery diarrhea, stomach cramps, dehydration",
            "nausea, vomiting, stomach pain, diarrhea",
            "abdominal pain, diarrhea, loss of appetite",
            "stomach cramps, vomiting, dehydration",
            "diarrhea, abdominal pain, stomach cramps",
        ],
    ),
    (
        "Asthma",
        &[
            "wheezing, shortness of breath, chest tightness",
            "shortness of breath, wheezing, night cough",
            "chest tightness, wheezing, breathlessness",
            "wheezing, night cough, shortness of breath",
            "breathlessness on exercise, wheezing, chest tightness",
            "chest tightness, shortness of breath, night cough",
            "wheezing, breathlessness, chest tightness",
            "shortness of breath, chest tightness, wheezing, cough",
        ],
    ),
];

/// Forty records, eight per label.
pub(crate) fn fixture_records() -> Vec<TrainingRecord> {
    FIXTURE
        .iter()
        .flat_map(|(label, rows)| rows.iter().map(|s| TrainingRecord::new(*s, *label)))
        .collect()
}

/// Default parameters with fewer trees, to keep tests quick.
pub(crate) fn small_training_params() -> TrainingParams {
    TrainingParams {
        forest: ForestParams {
            n_estimators: 25,
            ..ForestParams::default()
        },
        ..TrainingParams::default()
    }
}

static TRAINED: LazyLock<ModelArtifact> = LazyLock::new(|| {
    train_model(&fixture_records(), &small_training_params())
        .expect("fixture corpus should train")
});

pub(crate) fn trained_artifact() -> ModelArtifact {
    TRAINED.clone()
}

pub(crate) fn ready_engine() -> ClassificationEngine {
    ClassificationEngine::from_artifact(trained_artifact())
}
