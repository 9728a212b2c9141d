//! Conversion from parsed LightGBM trees to [`Forest`].

use crate::repr::{Child, Forest, Split, SplitRule, Tree};

use super::text::{DecisionType, LgbModel, LgbTree};

/// Error raised when a parsed model cannot be turned into a forest.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("tree {tree}: invalid child index {child} at node {node}")]
    InvalidChildIndex { tree: usize, node: usize, child: i32 },
    #[error("tree {tree}: split on feature {feature} but model has {n_features} features")]
    InvalidFeatureIndex {
        tree: usize,
        feature: i32,
        n_features: usize,
    },
    #[error("tree {tree}: invalid categorical split at node {node}")]
    InvalidCategoricalSplit { tree: usize, node: usize },
    #[error("linear trees are not supported")]
    LinearTreesNotSupported,
}

impl LgbModel {
    /// Build the forest; tree `i` feeds group `i % num_tree_per_iteration`.
    pub fn to_forest(&self) -> Result<Forest, ConversionError> {
        let n_groups = self.num_groups();
        let mut forest = Forest::new(n_groups).with_average_output(self.header.average_output);

        for (idx, lgb_tree) in self.trees.iter().enumerate() {
            let tree = convert_tree(lgb_tree, idx, self.num_features())?;
            forest.push_tree(tree, (idx % n_groups) as u32);
        }

        Ok(forest)
    }
}

fn convert_tree(lgb_tree: &LgbTree, idx: usize, n_features: usize) -> Result<Tree, ConversionError> {
    if lgb_tree.is_linear {
        return Err(ConversionError::LinearTreesNotSupported);
    }

    // leaf values already include shrinkage
    if lgb_tree.num_leaves == 1 {
        return Ok(Tree::constant(lgb_tree.leaf_value[0]));
    }

    let num_splits = lgb_tree.num_leaves - 1;
    let mut splits = Vec::with_capacity(num_splits);

    for node in 0..num_splits {
        let feature = lgb_tree.split_feature[node];
        if feature < 0 || feature as usize >= n_features {
            return Err(ConversionError::InvalidFeatureIndex {
                tree: idx,
                feature,
                n_features,
            });
        }

        let decision = DecisionType::from_bits(lgb_tree.decision_type[node]);
        let rule = if decision.is_categorical {
            SplitRule::Categorical {
                bitset: categorical_range(lgb_tree, node)
                    .ok_or(ConversionError::InvalidCategoricalSplit { tree: idx, node })?,
            }
        } else {
            SplitRule::Numerical {
                threshold: lgb_tree.threshold[node],
                default_left: decision.default_left,
                missing: decision.missing_type,
            }
        };

        let child = |raw: i32| {
            resolve_child(raw, num_splits).ok_or(ConversionError::InvalidChildIndex {
                tree: idx,
                node,
                child: raw,
            })
        };

        splits.push(Split {
            feature: feature as usize,
            rule,
            gain: lgb_tree.split_gain[node],
            left: child(lgb_tree.left_child[node])?,
            right: child(lgb_tree.right_child[node])?,
        });
    }

    Ok(Tree::from_parts(
        splits,
        lgb_tree.leaf_value.clone(),
        lgb_tree.cat_threshold.clone(),
    ))
}

/// Negative references are leaves (`!raw`), others are split indices.
fn resolve_child(raw: i32, num_splits: usize) -> Option<Child> {
    if raw < 0 {
        let leaf = !raw as usize;
        (leaf <= num_splits).then_some(Child::Leaf(leaf as u32))
    } else {
        // the root can never be a child
        (raw > 0 && (raw as usize) < num_splits).then_some(Child::Split(raw as u32))
    }
}

/// For a categorical node the threshold holds an index into `cat_boundaries`.
fn categorical_range(lgb_tree: &LgbTree, node: usize) -> Option<std::ops::Range<usize>> {
    let threshold = lgb_tree.threshold[node];
    if threshold < 0.0 || threshold.fract() != 0.0 {
        return None;
    }
    let cat_idx = threshold as usize;
    let start = usize::try_from(*lgb_tree.cat_boundaries.get(cat_idx)?).ok()?;
    let end = usize::try_from(*lgb_tree.cat_boundaries.get(cat_idx + 1)?).ok()?;
    (start <= end && end <= lgb_tree.cat_threshold.len()).then_some(start..end)
}
