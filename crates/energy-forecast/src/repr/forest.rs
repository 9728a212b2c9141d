//! Tree ensemble with per-group accumulation.

use ndarray::ArrayView1;

use super::Tree;

/// An additive ensemble of [`Tree`]s.
///
/// Each tree contributes to exactly one output group. Regression and binary
/// models have a single group; multiclass models have one per class.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: usize,
    average_output: bool,
}

impl Forest {
    pub fn new(n_groups: usize) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups: n_groups.max(1),
            average_output: false,
        }
    }

    /// Average instead of sum over iterations (random forest mode).
    pub fn with_average_output(mut self, average_output: bool) -> Self {
        self.average_output = average_output;
        self
    }

    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        debug_assert!((group as usize) < self.n_groups);
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Number of boosting iterations.
    pub fn n_iterations(&self) -> usize {
        self.trees.len() / self.n_groups
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Accumulate raw scores for one row into `out` (length `n_groups`).
    pub fn predict_row_into(&self, row: ArrayView1<'_, f64>, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.n_groups);
        out.fill(0.0);
        for (tree, &group) in self.trees.iter().zip(&self.tree_groups) {
            out[group as usize] += tree.predict(row);
        }
        if self.average_output {
            let n_iterations = self.n_iterations().max(1) as f64;
            out.iter_mut().for_each(|v| *v /= n_iterations);
        }
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut out = vec![0.0; self.n_groups];
        self.predict_row_into(row, &mut out);
        out
    }
}
