//! In-memory tree ensemble representation.
//!
//! - [`Tree`]: one decision tree with LightGBM's split semantics
//! - [`Forest`]: the additive ensemble, grouped by output

mod forest;
mod tree;

pub use forest::Forest;
pub use tree::{Child, Split, SplitRule, Tree};
