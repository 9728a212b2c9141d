//! Ranked feature importance table.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of a [`FeatureImportance`] table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceRow {
    #[serde(rename = "Feature")]
    pub feature: String,
    #[serde(rename = "Importance")]
    pub importance: f64,
}

/// Two-column `Feature` / `Importance` table, most important first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureImportance {
    rows: Vec<ImportanceRow>,
}

impl FeatureImportance {
    /// Pair `features` with `importances` by position and rank them.
    ///
    /// The sort is stable: equal importances keep their model order.
    pub fn ranked(features: &[String], importances: &[f64]) -> Self {
        debug_assert_eq!(features.len(), importances.len());
        let mut rows: Vec<ImportanceRow> = features
            .iter()
            .zip(importances)
            .map(|(feature, &importance)| ImportanceRow {
                feature: feature.clone(),
                importance,
            })
            .collect();
        rows.sort_by(|a, b| descending_nan_last(a.importance, b.importance));
        Self { rows }
    }

    pub fn rows(&self) -> &[ImportanceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.feature.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.importance).collect()
    }

    /// The `k` most important rows.
    pub fn top_k(&self, k: usize) -> &[ImportanceRow] {
        &self.rows[..k.min(self.rows.len())]
    }

    /// Importances scaled to sum to one. Left unchanged when the total is zero.
    pub fn normalized(&self) -> Self {
        let total: f64 = self.rows.iter().map(|row| row.importance).sum();
        if total <= 0.0 {
            return self.clone();
        }
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| ImportanceRow {
                    feature: row.feature.clone(),
                    importance: row.importance / total,
                })
                .collect(),
        }
    }
}

impl fmt::Display for FeatureImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|row| row.feature.len())
            .chain(std::iter::once("Feature".len()))
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<width$}  {:>14}", "Feature", "Importance")?;
        for row in &self.rows {
            writeln!(f, "{:<width$}  {:>14.6}", row.feature, row.importance)?;
        }
        Ok(())
    }
}

/// Descending order with NaN after every number.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
