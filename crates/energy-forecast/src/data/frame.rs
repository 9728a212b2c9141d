//! Column-labeled feature table.

use std::collections::{BTreeMap, HashMap};

use ndarray::{Array2, ArrayView2, Axis};

/// Errors raised when building a [`LabeledFrame`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("{n_names} column names given for a table with {n_columns} columns")]
    ShapeMismatch { n_names: usize, n_columns: usize },
}

/// Result of [`LabeledFrame::select`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Columns in the requested order, extras dropped.
    Complete(Array2<f64>),
    /// Requested names absent from the frame, in request order.
    Missing(Vec<String>),
}

/// A table whose columns are addressed by name.
///
/// Values are stored sample-major: shape `[n_rows, n_columns]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledFrame {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    values: Array2<f64>,
}

impl LabeledFrame {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self, FrameError> {
        if columns.len() != values.ncols() {
            return Err(FrameError::ShapeMismatch {
                n_names: columns.len(),
                n_columns: values.ncols(),
            });
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (pos, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), pos).is_some() {
                return Err(FrameError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            columns,
            index,
            values,
        })
    }

    /// Build a frame from records such as parsed JSON objects.
    ///
    /// Columns are the union of all record keys in sorted order. A key that
    /// is absent from a record, or null, becomes NaN.
    pub fn from_records(records: &[BTreeMap<String, Option<f64>>]) -> Self {
        let columns: Vec<String> = records
            .iter()
            .flat_map(|record| record.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let values = Array2::from_shape_fn((records.len(), columns.len()), |(row, col)| {
            records[row]
                .get(&columns[col])
                .copied()
                .flatten()
                .unwrap_or(f64::NAN)
        });

        let index = columns
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos))
            .collect();

        Self {
            columns,
            index,
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Pick `names` in that order, dropping every other column.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Selection {
        let mut positions = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_position(name.as_ref()) {
                Some(pos) => positions.push(pos),
                None => missing.push(name.as_ref().to_string()),
            }
        }

        if missing.is_empty() {
            Selection::Complete(self.values.select(Axis(1), &positions))
        } else {
            Selection::Missing(missing)
        }
    }
}
