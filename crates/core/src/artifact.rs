//! Persisted model artifact: a fitted vectorizer and classifier stored as two JSON files.
//!
//! Every file embeds `schema_version`. Loading reads that header first and refuses files written
//! with a different layout, before attempting to deserialize the body.

use crate::constants::{ARTIFACT_SCHEMA_VERSION, CLASSIFIER_FILENAME, VECTORIZER_FILENAME};
use crate::error::{CoreError, CoreResult};
use crate::ml::{RandomForest, TfidfVectorizer};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of the two artifact halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `model_dir`.
    pub fn in_dir(model_dir: &Path) -> Self {
        Self {
            vectorizer: model_dir.join(VECTORIZER_FILENAME),
            classifier: model_dir.join(CLASSIFIER_FILENAME),
        }
    }

    /// True only if both files exist.
    pub fn exists(&self) -> bool {
        self.vectorizer.is_file() && self.classifier.is_file()
    }

    /// The first half that is missing, if any.
    fn first_missing(&self) -> Option<&Path> {
        [&self.vectorizer, &self.classifier]
            .into_iter()
            .find(|p| !p.is_file())
            .map(PathBuf::as_path)
    }
}

/// Facts recorded when the model was trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub n_records: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Held-out accuracy in `[0, 1]`.
    pub accuracy: f64,
    pub oob_score: Option<f64>,
}

#[derive(Deserialize)]
struct SchemaHeader {
    schema_version: u32,
}

#[derive(Serialize, Deserialize)]
struct VectorizerFile<V> {
    schema_version: u32,
    vectorizer: V,
}

#[derive(Serialize, Deserialize)]
struct ClassifierFile<M, F> {
    schema_version: u32,
    metadata: M,
    forest: F,
}

/// The fitted model pair plus training metadata.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub vectorizer: TfidfVectorizer,
    pub forest: RandomForest,
    pub metadata: ModelMetadata,
}

impl ModelArtifact {
    /// Writes both halves, creating the parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` or `CoreError::ArtifactWrite`.
    pub fn save(&self, paths: &ArtifactPaths) -> CoreResult<()> {
        let vectorizer = VectorizerFile {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            vectorizer: &self.vectorizer,
        };
        let classifier = ClassifierFile {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            metadata: &self.metadata,
            forest: &self.forest,
        };
        write_json(&paths.vectorizer, &vectorizer)?;
        write_json(&paths.classifier, &classifier)?;

        tracing::info!(
            vectorizer = %paths.vectorizer.display(),
            classifier = %paths.classifier.display(),
            "saved model artifact"
        );
        Ok(())
    }

    /// Reads and checks both halves.
    ///
    /// # Errors
    ///
    /// - `CoreError::ArtifactMissing` if either file is absent.
    /// - `CoreError::ArtifactRead` / `CoreError::ArtifactParse` for unreadable or malformed files.
    /// - `CoreError::ArtifactSchemaMismatch` if a file was written with another schema version.
    /// - `CoreError::ArtifactInconsistent` if the halves do not fit together.
    pub fn load(paths: &ArtifactPaths) -> CoreResult<Self> {
        if let Some(missing) = paths.first_missing() {
            return Err(CoreError::ArtifactMissing {
                path: missing.to_path_buf(),
            });
        }

        let vectorizer: VectorizerFile<TfidfVectorizer> = read_versioned(&paths.vectorizer)?;
        let classifier: ClassifierFile<ModelMetadata, RandomForest> =
            read_versioned(&paths.classifier)?;

        let artifact = Self {
            vectorizer: vectorizer.vectorizer,
            forest: classifier.forest,
            metadata: classifier.metadata,
        };
        artifact.check_consistency()?;

        tracing::info!(
            trees = artifact.forest.n_trees(),
            features = artifact.vectorizer.n_features(),
            labels = artifact.forest.classes().len(),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    fn check_consistency(&self) -> CoreResult<()> {
        self.vectorizer.check_consistency()?;
        self.forest.check_consistency()?;
        if self.forest.n_features() != self.vectorizer.n_features() {
            return Err(CoreError::ArtifactInconsistent(format!(
                "classifier expects {} features but vectorizer produces {}",
                self.forest.n_features(),
                self.vectorizer.n_features()
            )));
        }
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CoreError::ArtifactWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_vec(value).map_err(CoreError::Serialization)?;
    fs::write(path, json).map_err(|source| CoreError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn read_versioned<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let bytes = fs::read(path).map_err(|source| CoreError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |source| CoreError::ArtifactParse {
        path: path.to_path_buf(),
        source,
    };

    let header: SchemaHeader = serde_json::from_slice(&bytes).map_err(parse_error)?;
    if header.schema_version != ARTIFACT_SCHEMA_VERSION {
        return Err(CoreError::ArtifactSchemaMismatch {
            path: path.to_path_buf(),
            found: header.schema_version,
            expected: ARTIFACT_SCHEMA_VERSION,
        });
    }
    serde_json::from_slice(&bytes).map_err(parse_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trained_artifact;

    #[test]
    fn save_then_load_gives_same_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(&dir.path().join("model"));
        let artifact = trained_artifact();

        artifact.save(&paths).unwrap();
        assert!(paths.exists());

        let loaded = ModelArtifact::load(&paths).unwrap();
        assert_eq!(loaded.metadata, artifact.metadata);
        let text = "fever dry cough body ache";
        assert_eq!(
            loaded.forest.predict_proba(&loaded.vectorizer.transform(text)),
            artifact.forest.predict_proba(&artifact.vectorizer.transform(text))
        );
    }

    #[test]
    fn missing_half_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        trained_artifact().save(&paths).unwrap();
        fs::remove_file(&paths.classifier).unwrap();

        assert!(!paths.exists());
        match ModelArtifact::load(&paths) {
            Err(CoreError::ArtifactMissing { path }) => assert_eq!(path, paths.classifier),
            other => panic!("expected ArtifactMissing, got {other:?}"),
        }
    }

    #[test]
    fn other_schema_version_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        trained_artifact().save(&paths).unwrap();
        // Header is valid, body is not; the version check must come first.
        fs::write(&paths.vectorizer, r#"{"schema_version": 99, "vectorizer": null}"#).unwrap();

        match ModelArtifact::load(&paths) {
            Err(CoreError::ArtifactSchemaMismatch {
                found, expected, ..
            }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, ARTIFACT_SCHEMA_VERSION);
            }
            other => panic!("expected ArtifactSchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        trained_artifact().save(&paths).unwrap();
        fs::write(&paths.classifier, b"not json").unwrap();

        assert!(matches!(
            ModelArtifact::load(&paths),
            Err(CoreError::ArtifactParse { .. })
        ));
    }

    #[test]
    fn halves_from_different_models_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let artifact = trained_artifact();
        artifact.save(&paths).unwrap();

        let other = TfidfVectorizer::fit(
            &["fever cough", "fever cough", "rash itching", "rash itching"],
            Default::default(),
        )
        .unwrap();
        write_json(
            &paths.vectorizer,
            &VectorizerFile {
                schema_version: ARTIFACT_SCHEMA_VERSION,
                vectorizer: &other,
            },
        )
        .unwrap();

        assert!(matches!(
            ModelArtifact::load(&paths),
            Err(CoreError::ArtifactInconsistent(_))
        ));
    }
}
