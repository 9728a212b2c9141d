//! Crate-level error types.

use std::path::PathBuf;

use crate::compat::lightgbm::{ConversionError, ParseError};
use crate::metadata::MetadataError;
use crate::model::InferenceError;

/// Why a model file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Errors surfaced by [`Predictor`](crate::Predictor).
///
/// Construction fails with the first three variants; `predict` and
/// `get_feature_importance` with the rest. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("failed to load model from {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
    #[error("failed to load metadata from {}: {source}", path.display())]
    MetadataLoad {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
    #[error("invalid metadata in {}: {message}", path.display())]
    MetadataSchema { path: PathBuf, message: String },
    #[error("missing required feature column(s): {}", missing.join(", "))]
    MissingFeature { missing: Vec<String> },
    #[error("model reports {actual} feature importances but metadata lists {expected} features")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl PredictorError {
    pub(crate) fn metadata(path: impl Into<PathBuf>, source: MetadataError) -> Self {
        let path = path.into();
        match source {
            MetadataError::Schema(message) => PredictorError::MetadataSchema { path, message },
            source => PredictorError::MetadataLoad { path, source },
        }
    }
}
