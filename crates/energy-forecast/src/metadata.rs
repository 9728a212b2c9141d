//! JSON sidecar describing a deployed model.
//!
//! ```json
//! {
//!   "feature_names": ["temp", "humidity"],
//!   "performance_metrics": { "test_rmse": 12.34 }
//! }
//! ```
//!
//! Any other keys are kept in [`ModelMetadata::extra`] and
//! [`PerformanceMetrics::other`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors raised while reading metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Schema(String),
}

/// Recorded evaluation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub test_rmse: f64,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Model metadata as written next to the model at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Training column order; also the full set of accepted inputs.
    pub feature_names: Vec<String>,
    pub performance_metrics: PerformanceMetrics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelMetadata {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a metadata document.
    ///
    /// Malformed JSON is a [`MetadataError::Json`]; well-formed JSON with
    /// the wrong shape is a [`MetadataError::Schema`].
    pub fn from_json_str(content: &str) -> Result<Self, MetadataError> {
        let document: Value = serde_json::from_str(content)?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self, MetadataError> {
        let metadata: ModelMetadata = serde_json::from_value(document)
            .map_err(|e| MetadataError::Schema(e.to_string()))?;
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<(), MetadataError> {
        if self.feature_names.is_empty() {
            return Err(MetadataError::Schema("feature_names must not be empty".into()));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn test_rmse(&self) -> f64 {
        self.performance_metrics.test_rmse
    }
}
