//! The deployed predictor.
//!
//! A [`Predictor`] pairs a trained ensemble with the metadata recorded at
//! training time. It exists only in the ready state: construction either
//! loads both files completely or fails, and nothing changes afterwards.

use std::path::Path;

use ndarray::Array1;
use tracing::{debug, info};

use crate::config::PredictorConfig;
use crate::data::{FeatureInput, Selection};
use crate::error::PredictorError;
use crate::importance::FeatureImportance;
use crate::metadata::ModelMetadata;
use crate::model::{Booster, Ensemble};

/// A loaded model ready for `predict` and `get_feature_importance`.
///
/// Generic over the [`Ensemble`] so the inference engine can be swapped
/// without touching column handling; [`Booster`] is the LightGBM one.
#[derive(Debug, Clone)]
pub struct Predictor<E = Booster> {
    ensemble: E,
    metadata: ModelMetadata,
}

impl Predictor<Booster> {
    /// Load a LightGBM text model and its metadata sidecar.
    pub fn load(
        model_path: impl AsRef<Path>,
        metadata_path: impl AsRef<Path>,
    ) -> Result<Self, PredictorError> {
        Self::load_with_threads(model_path.as_ref(), metadata_path.as_ref(), 1)
    }

    pub fn from_config(config: &PredictorConfig) -> Result<Self, PredictorError> {
        Self::load_with_threads(&config.model_path, &config.metadata_path, config.n_threads)
    }

    fn load_with_threads(
        model_path: &Path,
        metadata_path: &Path,
        n_threads: usize,
    ) -> Result<Self, PredictorError> {
        debug!(model = %model_path.display(), metadata = %metadata_path.display(), "Loading predictor");

        let booster = Booster::from_file(model_path)
            .map_err(|source| PredictorError::ModelLoad {
                path: model_path.to_path_buf(),
                source,
            })?
            .with_threads(n_threads);

        let metadata = ModelMetadata::from_file(metadata_path)
            .map_err(|e| PredictorError::metadata(metadata_path, e))?;

        Ok(Self::from_parts(booster, metadata))
    }
}

impl<E: Ensemble> Predictor<E> {
    /// Wrap an already loaded ensemble.
    pub fn from_parts(ensemble: E, metadata: ModelMetadata) -> Self {
        info!("Model loaded successfully");
        info!(n_features = metadata.n_features(), "Expected features: {}", metadata.n_features());
        info!(
            test_rmse = metadata.test_rmse(),
            "Model performance - Test RMSE: {:.2}",
            metadata.test_rmse()
        );
        for (name, value) in &metadata.performance_metrics.other {
            debug!(metric = %name, value = %value, "Recorded metric");
        }

        Self { ensemble, metadata }
    }

    /// Training feature order.
    pub fn feature_names(&self) -> &[String] {
        &self.metadata.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.metadata.n_features()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn ensemble(&self) -> &E {
        &self.ensemble
    }

    /// One prediction per input row, in row order.
    ///
    /// A labeled table is reduced to the training features in training
    /// order; any absent feature fails the whole call. A raw matrix is
    /// forwarded as is, so the caller is responsible for its column order.
    pub fn predict<'a>(
        &self,
        input: impl Into<FeatureInput<'a>>,
    ) -> Result<Array1<f64>, PredictorError> {
        let predictions = match input.into() {
            FeatureInput::Labeled(frame) => match frame.select(self.feature_names()) {
                Selection::Complete(rows) => self.ensemble.infer(rows.view())?,
                Selection::Missing(missing) => {
                    return Err(PredictorError::MissingFeature { missing })
                }
            },
            FeatureInput::Raw(rows) => self.ensemble.infer(rows)?,
        };
        Ok(predictions)
    }

    /// Gain importances paired with the feature names, most important first.
    pub fn get_feature_importance(&self) -> Result<FeatureImportance, PredictorError> {
        let gains = self.ensemble.gain_importances();
        if gains.len() != self.n_features() {
            return Err(PredictorError::FeatureCountMismatch {
                expected: self.n_features(),
                actual: gains.len(),
            });
        }
        Ok(FeatureImportance::ranked(self.feature_names(), &gains))
    }
}
