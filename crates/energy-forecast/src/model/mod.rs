//! Trained ensembles and the interface the predictor sees them through.
//!
//! - [`Ensemble`]: the two capabilities a predictor needs
//! - [`Booster`]: LightGBM text models evaluated natively
//! - [`Objective`]: output transform applied after the trees

mod booster;
mod objective;

use ndarray::{Array1, ArrayView2};

pub use booster::Booster;
pub use objective::Objective;

/// Errors raised by an ensemble's inference routine.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("input has {actual} columns but the model expects {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("model has {n_groups} outputs per row; only single-output models are supported")]
    MultiOutput { n_groups: usize },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A trained, read-only tree ensemble.
///
/// Implementations must not mutate state in either method, so a shared
/// reference can serve concurrent callers.
pub trait Ensemble {
    /// Predict one value per row of `rows` (shape `[n_rows, n_features]`),
    /// with columns already in training order.
    fn infer(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError>;

    /// Total split gain per feature, indexed by the model's feature order.
    fn gain_importances(&self) -> Vec<f64>;
}

impl<E: Ensemble + ?Sized> Ensemble for Box<E> {
    fn infer(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        (**self).infer(rows)
    }

    fn gain_importances(&self) -> Vec<f64> {
        (**self).gain_importances()
    }
}
