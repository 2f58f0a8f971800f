//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. Core code
//! never reads environment variables itself; binaries parse them with the helpers below.

use crate::artifact::ArtifactPaths;
use crate::constants::DEFAULT_SEED;
use crate::error::{CoreError, CoreResult};
use crate::training::TrainingParams;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    model_dir: PathBuf,
    dataset_path: PathBuf,
    training: TrainingParams,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidConfig` if either path is empty or the test fraction is not a
    /// proper fraction.
    pub fn new(
        model_dir: PathBuf,
        dataset_path: PathBuf,
        training: TrainingParams,
    ) -> CoreResult<Self> {
        if model_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig("model_dir cannot be empty".into()));
        }
        if dataset_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig(
                "dataset_path cannot be empty".into(),
            ));
        }
        if !(training.test_fraction > 0.0 && training.test_fraction < 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "test_fraction must be between 0 and 1, got {}",
                training.test_fraction
            )));
        }

        Ok(Self {
            model_dir,
            dataset_path,
            training,
        })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn training(&self) -> &TrainingParams {
        &self.training
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.model_dir)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a path from an optional string value, using `default` when unset or blank.
pub fn path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| default.to_string()))
}

/// Parse the training seed from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default seed.
pub fn seed_from_env_value(value: Option<String>) -> CoreResult<u64> {
    match non_blank(value) {
        None => Ok(DEFAULT_SEED),
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| CoreError::InvalidConfig(format!("invalid seed '{v}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CLASSIFIER_FILENAME, VECTORIZER_FILENAME};

    #[test]
    fn artifact_paths_live_in_model_dir() {
        let config = CoreConfig::new(
            PathBuf::from("models/v1"),
            PathBuf::from("data.csv"),
            TrainingParams::default(),
        )
        .unwrap();
        let paths = config.artifact_paths();
        assert_eq!(paths.vectorizer, Path::new("models/v1").join(VECTORIZER_FILENAME));
        assert_eq!(paths.classifier, Path::new("models/v1").join(CLASSIFIER_FILENAME));
    }

    #[test]
    fn empty_paths_are_rejected() {
        let err = CoreConfig::new(PathBuf::new(), PathBuf::from("d.csv"), TrainingParams::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
        assert!(
            CoreConfig::new(PathBuf::from("m"), PathBuf::new(), TrainingParams::default()).is_err()
        );
    }

    #[test]
    fn bad_test_fraction_is_rejected() {
        let training = TrainingParams {
            test_fraction: 1.5,
            ..TrainingParams::default()
        };
        assert!(CoreConfig::new(PathBuf::from("m"), PathBuf::from("d.csv"), training).is_err());
    }

    #[test]
    fn seed_defaults_when_unset_or_blank() {
        assert_eq!(seed_from_env_value(None).unwrap(), DEFAULT_SEED);
        assert_eq!(seed_from_env_value(Some("  ".into())).unwrap(), DEFAULT_SEED);
        assert_eq!(seed_from_env_value(Some(" 7 ".into())).unwrap(), 7);
        assert!(seed_from_env_value(Some("seven".into())).is_err());
    }

    #[test]
    fn path_defaults_when_unset_or_blank() {
        assert_eq!(path_from_env_value(None, "model"), PathBuf::from("model"));
        assert_eq!(path_from_env_value(Some("".into()), "model"), PathBuf::from("model"));
        assert_eq!(path_from_env_value(Some("/srv/m".into()), "model"), PathBuf::from("/srv/m"));
    }
}
