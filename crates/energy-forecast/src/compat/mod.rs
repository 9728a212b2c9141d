//! Loaders for models trained by external frameworks.

pub mod lightgbm;
