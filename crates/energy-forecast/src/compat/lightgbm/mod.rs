//! LightGBM text model support.
//!
//! Parses the `.txt` files written by `Booster.save_model()` and converts
//! them into a [`Forest`](crate::repr::Forest).
//!
//! # Format notes
//!
//! - Numerical splits go left when `value <= threshold`
//! - Child arrays encode leaves as negative values (`leaf = !child`)
//! - `decision_type` is a bitfield: categorical flag, default direction and
//!   missing-value type
//! - Categorical splits store their category sets as `u32` bitsets
//!
//! # Example
//!
//! ```ignore
//! use energy_forecast::compat::lightgbm::LgbModel;
//!
//! let model = LgbModel::from_file("lgbm_energy_model.txt")?;
//! let forest = model.to_forest()?;
//! ```

mod convert;
mod text;

pub use convert::ConversionError;
pub use text::*;
