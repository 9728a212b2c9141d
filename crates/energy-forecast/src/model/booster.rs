//! LightGBM booster evaluated natively.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::debug;

use crate::compat::lightgbm::LgbModel;
use crate::error::ModelError;
use crate::repr::Forest;
use crate::utils::run_with_threads;

use super::{Ensemble, InferenceError, Objective};

/// A loaded LightGBM model.
///
/// Holds the converted forest plus what LightGBM's `predict` and
/// `feature_importance` need: the objective transform and the feature count.
#[derive(Debug, Clone)]
pub struct Booster {
    forest: Forest,
    objective: Objective,
    n_features: usize,
    feature_names: Vec<String>,
    n_threads: usize,
}

impl Booster {
    /// Load a text model written by `Booster.save_model()`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let model = LgbModel::from_file(path)?;
        Self::from_lgb(&model)
    }

    pub fn from_string(content: &str) -> Result<Self, ModelError> {
        let model = LgbModel::from_string(content)?;
        Self::from_lgb(&model)
    }

    fn from_lgb(model: &LgbModel) -> Result<Self, ModelError> {
        let forest = model.to_forest()?;
        let objective = model
            .header
            .objective
            .as_deref()
            .map(Objective::parse)
            .unwrap_or(Objective::Identity);

        debug!(
            version = %model.header.version,
            n_trees = forest.n_trees(),
            n_groups = forest.n_groups(),
            n_features = model.num_features(),
            objective = ?objective,
            "Parsed LightGBM model"
        );

        Ok(Self {
            forest,
            objective,
            n_features: model.num_features(),
            feature_names: model.header.feature_names.clone(),
            n_threads: 1,
        })
    }

    /// Thread count for batch prediction: 0 = auto, 1 = sequential (default),
    /// >1 = exact count. Results do not depend on it.
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_groups(&self) -> usize {
        self.forest.n_groups()
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// Feature names stored in the model file (may be empty).
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Transformed predictions, shape `[n_rows, n_groups]`.
    pub fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        self.predict_with(rows, true)
    }

    /// Raw margins (no objective transform), shape `[n_rows, n_groups]`.
    pub fn predict_raw(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        self.predict_with(rows, false)
    }

    fn predict_with(
        &self,
        rows: ArrayView2<'_, f64>,
        transform: bool,
    ) -> Result<Array2<f64>, InferenceError> {
        if rows.ncols() != self.n_features {
            return Err(InferenceError::FeatureCountMismatch {
                expected: self.n_features,
                actual: rows.ncols(),
            });
        }

        let n_rows = rows.nrows();
        let n_groups = self.n_groups();
        let per_row = run_with_threads(self.n_threads, |parallelism| {
            parallelism.maybe_par_map(0..n_rows, |i| {
                let mut scores = self.forest.predict_row(rows.row(i));
                if transform {
                    self.objective.transform(&mut scores);
                }
                scores
            })
        })?;

        let mut output = Array2::zeros((n_rows, n_groups));
        for (mut out_row, scores) in output.rows_mut().into_iter().zip(per_row) {
            out_row.assign(&ArrayView1::from(scores.as_slice()));
        }
        Ok(output)
    }

    /// Sum of positive split gains per feature, as LightGBM's
    /// `feature_importance(importance_type="gain")`.
    pub fn gain_importance(&self) -> Vec<f64> {
        let mut importance = vec![0.0; self.n_features];
        for split in self.forest.trees().flat_map(|tree| tree.splits()) {
            if split.gain > 0.0 {
                importance[split.feature] += split.gain;
            }
        }
        importance
    }

    /// Number of splits per feature.
    pub fn split_importance(&self) -> Vec<f64> {
        let mut importance = vec![0.0; self.n_features];
        for split in self.forest.trees().flat_map(|tree| tree.splits()) {
            importance[split.feature] += 1.0;
        }
        importance
    }
}

impl Ensemble for Booster {
    fn infer(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        if self.n_groups() != 1 {
            return Err(InferenceError::MultiOutput {
                n_groups: self.n_groups(),
            });
        }
        Ok(self.predict(rows)?.column(0).to_owned())
    }

    fn gain_importances(&self) -> Vec<f64> {
        self.gain_importance()
    }
}
