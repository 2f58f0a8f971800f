//! # Classification engine
//!
//! Owns the trained model and turns normalized symptom text into a label, a probability
//! distribution and a display confidence.
//!
//! The engine only talks to the model through [`TextModel`], so tests and alternative models can be
//! plugged in without touching the pipeline. The model is installed before the engine is shared
//! and never mutated afterwards; `load` and `train` take `&mut self` and replace the model only
//! once the new one is fully built.

use crate::artifact::{ArtifactPaths, ModelArtifact, ModelMetadata};
use crate::config::CoreConfig;
use crate::dataset::TrainingRecord;
use crate::error::{CoreError, CoreResult};
use crate::ml::forest::argmax;
use crate::training::{train_from_csv, train_model, TrainingParams};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// What the engine needs from a model.
pub trait TextModel: Send + Sync + fmt::Debug {
    /// Maps normalized text to a feature vector.
    fn vectorize(&self, text: &str) -> Vec<f64>;

    /// Probability for every known label.
    fn classify(&self, features: &[f64]) -> ClassProbabilities<'_>;
}

/// Labels and their probabilities, index-aligned. Labels are in the model's class order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities<'a> {
    pub labels: &'a [String],
    pub probabilities: Vec<f64>,
}

impl TextModel for ModelArtifact {
    fn vectorize(&self, text: &str) -> Vec<f64> {
        self.vectorizer.transform(text)
    }

    fn classify(&self, features: &[f64]) -> ClassProbabilities<'_> {
        ClassProbabilities {
            labels: self.forest.classes(),
            probabilities: self.forest.predict_proba(features),
        }
    }
}

/// Display-only inflation of the top class probability, as a percentage with one decimal.
///
/// Not a calibration: above 0.5 the probability is scaled by 1.3, above 0.3 by 1.2, both capped
/// at 1. Values at or below 0.3 are shown as is.
///
/// The one-decimal rounding works on the exact decimal value of the percentage, ties to even, so
/// `76.05` stored as `76.0499...` shows as `76.0`.
pub fn boost_confidence(probability: f64) -> f64 {
    let percent = if probability > 0.5 {
        (probability * 1.3).min(1.0) * 100.0
    } else if probability > 0.3 {
        (probability * 1.2).min(1.0) * 100.0
    } else {
        probability * 100.0
    };
    round_to_tenth(percent)
}

fn round_to_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    /// Raw top probability in `[0, 1]`.
    pub probability: f64,
    /// Boosted display confidence in `[0, 100]`.
    pub confidence_percent: f64,
    /// Every label with its raw probability, in model class order.
    pub distribution: Vec<(String, f64)>,
}

impl Classification {
    /// The `n` most probable labels, highest first. Equal probabilities keep class order.
    pub fn top(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .distribution
            .iter()
            .map(|(label, p)| (label.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Shape and training scores of the installed model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub trees: usize,
    pub vocabulary_size: usize,
    pub labels: Vec<String>,
    pub metadata: ModelMetadata,
}

impl ModelSummary {
    fn of(artifact: &ModelArtifact) -> Self {
        Self {
            trees: artifact.forest.n_trees(),
            vocabulary_size: artifact.vectorizer.n_features(),
            labels: artifact.forest.classes().to_vec(),
            metadata: artifact.metadata.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ClassificationEngine {
    model: Option<Arc<dyn TextModel>>,
    summary: Option<ModelSummary>,
}

impl ClassificationEngine {
    /// An engine with no model; `classify` fails with `ModelNotReady` until one is installed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        let mut engine = Self::new();
        engine.install(artifact);
        engine
    }

    /// Uses an arbitrary model. No summary is available for such models.
    pub fn with_model(model: Arc<dyn TextModel>) -> Self {
        Self {
            model: Some(model),
            summary: None,
        }
    }

    pub fn install(&mut self, artifact: ModelArtifact) {
        self.summary = Some(ModelSummary::of(&artifact));
        self.model = Some(Arc::new(artifact));
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn summary(&self) -> Option<&ModelSummary> {
        self.summary.as_ref()
    }

    /// Loads the artifact at `paths`. On error the current model, if any, is kept.
    pub fn load(&mut self, paths: &ArtifactPaths) -> CoreResult<()> {
        let artifact = ModelArtifact::load(paths)?;
        self.install(artifact);
        Ok(())
    }

    /// Trains on `records` and installs the result. The model is not persisted.
    pub fn train(
        &mut self,
        records: &[TrainingRecord],
        params: &TrainingParams,
    ) -> CoreResult<ModelSummary> {
        let artifact = train_model(records, params)?;
        let summary = ModelSummary::of(&artifact);
        self.install(artifact);
        Ok(summary)
    }

    /// Classifies already-normalized text.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ModelNotReady` if no model is installed.
    pub fn classify(&self, normalized: &str) -> CoreResult<Classification> {
        let model = self.model.as_ref().ok_or(CoreError::ModelNotReady)?;
        let features = model.vectorize(normalized);
        let ClassProbabilities {
            labels,
            probabilities,
        } = model.classify(&features);

        if labels.is_empty() || labels.len() != probabilities.len() {
            return Err(CoreError::ArtifactInconsistent(format!(
                "model returned {} probabilities for {} labels",
                probabilities.len(),
                labels.len()
            )));
        }

        let best = argmax(&probabilities);
        let probability = probabilities[best];
        Ok(Classification {
            label: labels[best].clone(),
            probability,
            confidence_percent: boost_confidence(probability),
            distribution: labels.iter().cloned().zip(probabilities).collect(),
        })
    }
}

/// How the startup model was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    Loaded,
    /// Trained from the dataset because the artifact was missing or unusable.
    Trained { reason: String },
}

/// Loads the configured artifact, falling back to training from the dataset.
///
/// A missing, corrupt or outdated artifact triggers retraining when the dataset exists. The fresh
/// artifact is saved back; a failed save is logged and the in-memory model is still used.
///
/// # Errors
///
/// - `CoreError::NoModelSource` if the artifact is missing and there is no dataset.
/// - The load error itself if the artifact is unusable and there is no dataset.
/// - Any training error.
pub fn load_or_train(config: &CoreConfig) -> CoreResult<(ClassificationEngine, StartupOutcome)> {
    let paths = config.artifact_paths();
    let dataset = config.dataset_path();

    let reason = match ModelArtifact::load(&paths) {
        Ok(artifact) => {
            return Ok((
                ClassificationEngine::from_artifact(artifact),
                StartupOutcome::Loaded,
            ))
        }
        Err(CoreError::ArtifactMissing { .. }) if !dataset.is_file() => {
            return Err(CoreError::NoModelSource {
                model_dir: config.model_dir().to_path_buf(),
                dataset: dataset.to_path_buf(),
            });
        }
        Err(err) if !dataset.is_file() => return Err(err),
        Err(err) => err.to_string(),
    };

    tracing::warn!(%reason, dataset = %dataset.display(), "training a new model");
    let artifact = train_from_csv(dataset, config.training())?;
    if let Err(err) = artifact.save(&paths) {
        tracing::warn!(error = %err, "could not save trained model; continuing with it in memory");
    }

    Ok((
        ClassificationEngine::from_artifact(artifact),
        StartupOutcome::Trained { reason },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_records, ready_engine, small_training_params};
    use proptest::prelude::*;

    #[test]
    fn boosting_matches_the_three_bands() {
        assert_eq!(boost_confidence(0.6), 78.0);
        assert_eq!(boost_confidence(0.9), 100.0);
        assert_eq!(boost_confidence(0.4), 48.0);
        assert_eq!(boost_confidence(0.25), 25.0);
        assert_eq!(boost_confidence(0.0), 0.0);
        assert_eq!(boost_confidence(1.0), 100.0);
    }

    #[test]
    fn band_edges_are_exclusive() {
        // 0.5 is in the 1.2 band, 0.3 is not boosted at all.
        assert_eq!(boost_confidence(0.5), 60.0);
        assert_eq!(boost_confidence(0.3), 30.0);
        assert_eq!(boost_confidence(0.51), 66.3);
        assert_eq!(boost_confidence(0.31), 37.2);
    }

    #[test]
    fn rounding_uses_the_exact_decimal_value() {
        // With 200 pure-leaf trees the top probability is votes / 200.
        let cases = [
            (117, 76.0),
            (119, 77.3),
            (125, 81.2),
            (127, 82.5),
            (139, 90.3),
            (145, 94.2),
            (147, 95.5),
        ];
        for (votes, expected) in cases {
            assert_eq!(boost_confidence(votes as f64 / 200.0), expected, "votes={votes}");
        }
    }

    #[test]
    fn every_vote_fraction_rounds_to_one_decimal() {
        for votes in 0..=200 {
            let p = votes as f64 / 200.0;
            let shown = boost_confidence(p);
            let tenths = shown * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9, "votes={votes} shown={shown}");

            let unrounded = if p > 0.5 {
                (p * 1.3).min(1.0) * 100.0
            } else if p > 0.3 {
                (p * 1.2).min(1.0) * 100.0
            } else {
                p * 100.0
            };
            assert!((shown - unrounded).abs() <= 0.05 + 1e-9, "votes={votes}");
        }
    }

    proptest! {
        #[test]
        fn boosting_is_bounded(p in 0.0_f64..=1.0) {
            let shown = boost_confidence(p);
            prop_assert!((0.0..=100.0).contains(&shown));
            prop_assert!(shown >= p * 100.0 - 0.05 - 1e-9);
        }

        #[test]
        fn boosting_is_monotone_within_each_band(a in 0.0_f64..=1.0, b in 0.0_f64..=1.0) {
            let band = |p: f64| if p > 0.5 { 2 } else if p > 0.3 { 1 } else { 0 };
            prop_assume!(band(a) == band(b));
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(boost_confidence(low) <= boost_confidence(high));
        }
    }

    #[test]
    fn classify_without_model_is_not_ready() {
        let engine = ClassificationEngine::new();
        assert!(!engine.is_ready());
        assert!(matches!(
            engine.classify("fever cough"),
            Err(CoreError::ModelNotReady)
        ));
    }

    #[test]
    fn classification_is_in_the_known_set_and_repeatable() {
        let engine = ready_engine();
        let text = "fever dry cough fatigue headache";
        let first = engine.classify(text).unwrap();
        let labels = &engine.summary().unwrap().labels;

        assert!(labels.contains(&first.label));
        assert!((0.0..=100.0).contains(&first.confidence_percent));
        let total: f64 = first.distribution.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);

        for _ in 0..3 {
            assert_eq!(engine.classify(text).unwrap(), first);
        }
    }

    #[test]
    fn clear_cases_get_their_label() {
        let engine = ready_engine();
        assert_eq!(
            engine.classify("wheezing shortness of breath chest tightness").unwrap().label,
            "Asthma"
        );
        assert_eq!(
            engine.classify("runny nose sneezing sore throat").unwrap().label,
            "Common Cold"
        );
    }

    #[test]
    fn top_orders_by_probability() {
        let classification = ready_engine().classify("diarrhea vomiting stomach pain").unwrap();
        let top = classification.top(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, classification.label);
        assert!(top[0].1 >= top[1].1 && top[1].1 >= top[2].1);
    }

    #[test]
    fn train_installs_a_model() {
        let mut engine = ClassificationEngine::new();
        let summary = engine
            .train(&fixture_records(), &small_training_params())
            .unwrap();
        assert_eq!(summary.trees, 25);
        assert_eq!(summary.labels.len(), 5);
        assert!(engine.is_ready());
    }

    #[test]
    fn failed_load_keeps_the_current_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = ready_engine();
        let err = engine.load(&ArtifactPaths::in_dir(dir.path())).unwrap_err();
        assert!(matches!(err, CoreError::ArtifactMissing { .. }));
        assert!(engine.is_ready());
        assert!(engine.classify("fever cough").is_ok());
    }

    fn config_in(dir: &std::path::Path) -> CoreConfig {
        CoreConfig::new(dir.join("model"), dir.join("data.csv"), small_training_params()).unwrap()
    }

    fn write_fixture_csv(path: &std::path::Path) {
        let mut csv = String::from("symptoms,disease\n");
        for record in fixture_records() {
            csv.push_str(&format!("\"{}\",{}\n", record.symptoms, record.disease));
        }
        std::fs::write(path, csv).unwrap();
    }

    #[test]
    fn startup_without_artifact_or_dataset_fails_clearly() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_or_train(&config_in(dir.path())).unwrap_err();
        assert!(matches!(err, CoreError::NoModelSource { .. }));
    }

    #[test]
    fn startup_trains_saves_then_loads() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_fixture_csv(config.dataset_path());

        let (engine, outcome) = load_or_train(&config).unwrap();
        assert!(matches!(outcome, StartupOutcome::Trained { .. }));
        assert!(engine.is_ready());
        assert!(config.artifact_paths().exists());

        let (_, outcome) = load_or_train(&config).unwrap();
        assert_eq!(outcome, StartupOutcome::Loaded);
    }

    #[test]
    fn startup_retrains_over_an_outdated_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_fixture_csv(config.dataset_path());
        let paths = config.artifact_paths();
        std::fs::create_dir_all(config.model_dir()).unwrap();
        std::fs::write(&paths.vectorizer, r#"{"schema_version": 0}"#).unwrap();
        std::fs::write(&paths.classifier, r#"{"schema_version": 0}"#).unwrap();

        let (_, outcome) = load_or_train(&config).unwrap();
        match outcome {
            StartupOutcome::Trained { reason } => assert!(reason.contains("schema version")),
            other => panic!("expected retraining, got {other:?}"),
        }
    }

    #[test]
    fn outdated_artifact_without_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let paths = config.artifact_paths();
        std::fs::create_dir_all(config.model_dir()).unwrap();
        std::fs::write(&paths.vectorizer, r#"{"schema_version": 0}"#).unwrap();
        std::fs::write(&paths.classifier, r#"{"schema_version": 0}"#).unwrap();

        assert!(matches!(
            load_or_train(&config),
            Err(CoreError::ArtifactSchemaMismatch { .. })
        ));
    }
}
