//! Offline model fitting and evaluation.

use crate::artifact::{ModelArtifact, ModelMetadata};
use crate::constants::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use crate::dataset::{label_counts, load_dataset, stratified_split, TrainingRecord};
use crate::error::CoreResult;
use crate::ml::forest::argmax;
use crate::ml::{ForestParams, RandomForest, TfidfVectorizer, VectorizerParams};
use crate::text::normalize;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Everything that controls a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub vectorizer: VectorizerParams,
    pub forest: ForestParams,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerParams::default(),
            forest: ForestParams::default(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainingParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Fits a model on `records` and evaluates it on a stratified held-out split.
///
/// Symptom text is normalized before fitting. The vectorizer only sees the training side of the
/// split.
///
/// # Errors
///
/// Returns `CoreError::TrainingData` if the records cannot be split or fitted.
pub fn train_model(
    records: &[TrainingRecord],
    params: &TrainingParams,
) -> CoreResult<ModelArtifact> {
    let started = Instant::now();
    let n_labels = label_counts(records).len();
    tracing::info!(records = records.len(), labels = n_labels, "training model");

    let (train, test) = stratified_split(records, params.test_fraction, params.seed)?;

    let train_text: Vec<String> = train.iter().map(|r| normalize(&r.symptoms)).collect();
    let train_labels: Vec<&str> = train.iter().map(|r| r.disease.as_str()).collect();

    let vectorizer = TfidfVectorizer::fit(&train_text, params.vectorizer)?;
    tracing::debug!(features = vectorizer.n_features(), "fitted vectorizer");

    let train_rows: Vec<Vec<f64>> = train_text
        .par_iter()
        .map(|text| vectorizer.transform(text))
        .collect();
    let forest = RandomForest::fit(&train_rows, &train_labels, params.forest, params.seed)?;

    let test_rows: Vec<Vec<f64>> = test
        .par_iter()
        .map(|r| vectorizer.transform(&normalize(&r.symptoms)))
        .collect();
    let correct = forest
        .predict_proba_batch(&test_rows)
        .iter()
        .zip(&test)
        .filter(|(proba, record)| forest.classes()[argmax(proba)] == record.disease)
        .count();
    let accuracy = correct as f64 / test.len() as f64;

    let oob_score = forest.oob_score();
    tracing::info!(
        accuracy,
        oob_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model trained"
    );

    Ok(ModelArtifact {
        vectorizer,
        forest,
        metadata: ModelMetadata {
            trained_at: chrono::Utc::now(),
            seed: params.seed,
            n_records: records.len(),
            n_train: train.len(),
            n_test: test.len(),
            accuracy,
            oob_score,
        },
    })
}

/// Loads the CSV at `dataset` and trains on it.
pub fn train_from_csv(dataset: &Path, params: &TrainingParams) -> CoreResult<ModelArtifact> {
    let records = load_dataset(dataset)?;
    train_model(&records, params)
}
