use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("model not ready: load or train an artifact before classifying")]
    ModelNotReady,

    #[error("model artifact not found: {path}", path = path.display())]
    ArtifactMissing { path: PathBuf },
    #[error("failed to read model artifact {path}: {source}", path = path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact {path}: {source}", path = path.display())]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "model artifact {path} has schema version {found}, expected {expected}; retrain the model",
        path = path.display()
    )]
    ArtifactSchemaMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("model artifact is inconsistent: {0}")]
    ArtifactInconsistent(String),
    #[error("failed to write model artifact {path}: {source}", path = path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize model artifact: {0}")]
    Serialization(serde_json::Error),

    #[error("failed to read training dataset {path}: {source}", path = path.display())]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse training dataset: {0}")]
    DatasetParse(#[from] csv::Error),
    #[error("invalid training data: {0}")]
    TrainingData(String),

    #[error(
        "no model available: artifact missing in {model_dir} and dataset {dataset} not found",
        model_dir = model_dir.display(),
        dataset = dataset.display()
    )]
    NoModelSource { model_dir: PathBuf, dataset: PathBuf },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
