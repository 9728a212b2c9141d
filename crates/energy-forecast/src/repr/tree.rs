//! Immutable decision tree with LightGBM split semantics.

use std::ops::Range;

use ndarray::ArrayView1;

use crate::compat::lightgbm::MissingType;

/// Values this close to zero count as zero for [`MissingType::Zero`] splits.
const ZERO_THRESHOLD: f64 = 1e-35;

/// Where a split sends a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Split(u32),
    Leaf(u32),
}

/// Decision rule of an internal node.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// Left iff `value <= threshold`, with missing values routed by
    /// `default_left` according to `missing`.
    Numerical {
        threshold: f64,
        default_left: bool,
        missing: MissingType,
    },
    /// Left iff the category's bit is set in `tree.cat_bitset[bitset]`.
    Categorical { bitset: Range<usize> },
}

/// Internal node.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub feature: usize,
    pub rule: SplitRule,
    /// Training loss reduction recorded for this split.
    pub gain: f64,
    pub left: Child,
    pub right: Child,
}

/// A tree laid out as LightGBM does: splits `0..n_leaves - 1`, root at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    splits: Vec<Split>,
    leaf_values: Vec<f64>,
    cat_bitset: Vec<u32>,
}

impl Tree {
    /// Tree that always outputs `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            splits: Vec::new(),
            leaf_values: vec![value],
            cat_bitset: Vec::new(),
        }
    }

    /// Build a tree from already validated parts.
    ///
    /// Every [`Child`] must be in range and every categorical bitset range
    /// must lie within `cat_bitset`; the LightGBM converter checks this.
    pub fn from_parts(splits: Vec<Split>, leaf_values: Vec<f64>, cat_bitset: Vec<u32>) -> Self {
        debug_assert_eq!(splits.len() + 1, leaf_values.len());
        Self {
            splits,
            leaf_values,
            cat_bitset,
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.leaf_values.len()
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn leaf_values(&self) -> &[f64] {
        &self.leaf_values
    }

    /// Index of the leaf reached by `row`.
    pub fn leaf_index(&self, row: ArrayView1<'_, f64>) -> usize {
        if self.splits.is_empty() {
            return 0;
        }

        let mut node = 0usize;
        loop {
            let split = &self.splits[node];
            let go_left = self.goes_left(split, row[split.feature]);
            match if go_left { split.left } else { split.right } {
                Child::Split(next) => node = next as usize,
                Child::Leaf(leaf) => return leaf as usize,
            }
        }
    }

    /// Output of this tree for `row`.
    #[inline]
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.leaf_values[self.leaf_index(row)]
    }

    fn goes_left(&self, split: &Split, value: f64) -> bool {
        match &split.rule {
            SplitRule::Numerical {
                threshold,
                default_left,
                missing,
            } => {
                let value = if value.is_nan() && *missing != MissingType::NaN {
                    0.0
                } else {
                    value
                };
                let is_missing = match missing {
                    MissingType::None => false,
                    MissingType::Zero => value.abs() <= ZERO_THRESHOLD,
                    MissingType::NaN => value.is_nan(),
                };
                if is_missing {
                    *default_left
                } else {
                    value <= *threshold
                }
            }
            SplitRule::Categorical { bitset } => {
                if value.is_nan() {
                    return false;
                }
                // truncation toward zero, so -0.5 is category 0
                let category = value as i64;
                if category < 0 {
                    return false;
                }
                let words = &self.cat_bitset[bitset.clone()];
                let word = (category / 32) as usize;
                words
                    .get(word)
                    .is_some_and(|bits| (bits >> (category % 32)) & 1 == 1)
            }
        }
    }
}
