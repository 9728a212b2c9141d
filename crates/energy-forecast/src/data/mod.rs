//! Prediction inputs.
//!
//! A batch arrives either as a [`LabeledFrame`], whose columns are matched
//! to the model's features by name, or as a raw matrix that the caller has
//! already ordered.

mod frame;

use ndarray::{Array2, ArrayView2};

pub use frame::{FrameError, LabeledFrame, Selection};

/// A batch of feature rows.
#[derive(Debug, Clone, Copy)]
pub enum FeatureInput<'a> {
    /// Columns addressed by name; reordered before inference.
    Labeled(&'a LabeledFrame),
    /// Columns assumed to be in training order; passed through untouched.
    Raw(ArrayView2<'a, f64>),
}

impl<'a> From<&'a LabeledFrame> for FeatureInput<'a> {
    fn from(frame: &'a LabeledFrame) -> Self {
        FeatureInput::Labeled(frame)
    }
}

impl<'a> From<ArrayView2<'a, f64>> for FeatureInput<'a> {
    fn from(rows: ArrayView2<'a, f64>) -> Self {
        FeatureInput::Raw(rows)
    }
}

impl<'a> From<&'a Array2<f64>> for FeatureInput<'a> {
    fn from(rows: &'a Array2<f64>) -> Self {
        FeatureInput::Raw(rows.view())
    }
}
