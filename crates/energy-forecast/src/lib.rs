//! energy-forecast: serve a pretrained LightGBM energy consumption model.
//!
//! Loads a LightGBM text model and its JSON metadata sidecar, aligns
//! incoming feature tables to the training column order, and reports
//! gain-based feature importances.
//!
//! # Key Types
//!
//! - [`Predictor`] - Model plus metadata, with `predict` and `get_feature_importance`
//! - [`ModelMetadata`] - Feature order and recorded test metrics
//! - [`LabeledFrame`] / [`FeatureInput`] - Prediction inputs
//! - [`FeatureImportance`] - Ranked importance table
//! - [`Ensemble`] / [`Booster`] - Inference engine seam and its LightGBM implementation
//!
//! # Example
//!
//! ```ignore
//! use energy_forecast::{LabeledFrame, Predictor};
//! use ndarray::arr2;
//!
//! let predictor = Predictor::load("models/lgbm_energy_model.txt", "models/model_metadata.json")?;
//! let frame = LabeledFrame::new(
//!     vec!["humidity".into(), "temp".into()],
//!     arr2(&[[0.5, 20.0]]),
//! )?;
//! let predictions = predictor.predict(&frame)?;
//! println!("{}", predictor.get_feature_importance()?);
//! ```

pub mod compat;
pub mod config;
pub mod data;
pub mod error;
pub mod importance;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod predictor;
pub mod repr;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use crate::config::{AppConfig, PredictorConfig};
pub use data::{FeatureInput, LabeledFrame};
pub use error::PredictorError;
pub use importance::{FeatureImportance, ImportanceRow};
pub use metadata::ModelMetadata;
pub use model::{Booster, Ensemble, InferenceError};
pub use predictor::Predictor;
pub use utils::{run_with_threads, Parallelism};
