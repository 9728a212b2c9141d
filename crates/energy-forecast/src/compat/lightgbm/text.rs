//! Reader for LightGBM's text model format.
//!
//! A text model (`Booster.save_model()`) is a sequence of `key=value` lines:
//! a header block, one block per tree introduced by `Tree=N`, and a footer
//! after `end of trees` (importances, parameters) which is not needed for
//! inference and is skipped.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// Error types
// =============================================================================

/// Error raised while reading a LightGBM text model.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("array size mismatch for {field}: expected {expected}, got {actual}")]
    ArraySizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("model contains no trees")]
    NoTrees,
}

// =============================================================================
// Decision type bitfield
// =============================================================================

/// How a numerical split treats missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingType {
    #[default]
    None,
    /// Values within `±1e-35` are missing.
    Zero,
    /// NaN is missing.
    NaN,
}

/// Decoded per-node `decision_type` bitfield.
///
/// Bit 0 flags a categorical split, bit 1 sends missing values left and
/// bits 2-3 hold the [`MissingType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecisionType {
    pub is_categorical: bool,
    pub default_left: bool,
    pub missing_type: MissingType,
}

impl DecisionType {
    pub fn from_bits(value: i8) -> Self {
        let bits = value as u8;
        let missing_type = match (bits >> 2) & 3 {
            1 => MissingType::Zero,
            2 => MissingType::NaN,
            _ => MissingType::None,
        };
        Self {
            is_categorical: bits & 1 != 0,
            default_left: bits & 2 != 0,
            missing_type,
        }
    }
}

// =============================================================================
// Parsed structures
// =============================================================================

/// Header block of a text model.
#[derive(Debug, Clone)]
pub struct LgbHeader {
    pub version: String,
    pub num_class: usize,
    pub num_tree_per_iteration: usize,
    /// Highest feature index; at most `i32::MAX`, like LightGBM's `int` indices.
    pub max_feature_idx: usize,
    /// Raw objective line, e.g. `binary sigmoid:1`.
    pub objective: Option<String>,
    pub average_output: bool,
    pub feature_names: Vec<String>,
}

/// One `Tree=N` block, still in LightGBM's array-of-fields layout.
///
/// Internal nodes are indexed `0..num_leaves - 1`; a negative child `c`
/// refers to leaf `!c`.
#[derive(Debug, Clone, Default)]
pub struct LgbTree {
    pub num_leaves: usize,
    pub num_cat: usize,
    pub split_feature: Vec<i32>,
    pub split_gain: Vec<f64>,
    pub threshold: Vec<f64>,
    pub decision_type: Vec<i8>,
    pub left_child: Vec<i32>,
    pub right_child: Vec<i32>,
    pub leaf_value: Vec<f64>,
    pub cat_boundaries: Vec<i32>,
    pub cat_threshold: Vec<u32>,
    pub shrinkage: f64,
    pub is_linear: bool,
}

/// A parsed LightGBM text model.
#[derive(Debug, Clone)]
pub struct LgbModel {
    pub header: LgbHeader,
    pub trees: Vec<LgbTree>,
}

impl LgbModel {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_string(&content)
    }

    pub fn from_string(content: &str) -> Result<Self, ParseError> {
        let mut lines = content.lines().map(str::trim_end).peekable();

        let mut header_fields = Fields::default();
        let mut average_output = false;
        while let Some(line) = lines.peek().copied() {
            if line.starts_with("Tree=") || line == "end of trees" {
                break;
            }
            lines.next();
            match line.split_once('=') {
                Some((key, value)) => header_fields.insert(key, value),
                None if line == "average_output" => average_output = true,
                // model type line ("tree") and blank separators
                None => {}
            }
        }
        let header = header_fields.into_header(average_output)?;

        let mut trees = Vec::new();
        while let Some(line) = lines.next() {
            if line == "end of trees" {
                break;
            }
            if !line.starts_with("Tree=") {
                continue;
            }
            let mut fields = Fields::default();
            while let Some(line) = lines.peek().copied() {
                if line.is_empty() || line.starts_with("Tree=") || line == "end of trees" {
                    break;
                }
                lines.next();
                if let Some((key, value)) = line.split_once('=') {
                    fields.insert(key, value);
                }
            }
            trees.push(fields.into_tree()?);
        }

        if trees.is_empty() {
            return Err(ParseError::NoTrees);
        }

        Ok(Self { header, trees })
    }

    pub fn num_features(&self) -> usize {
        self.header.max_feature_idx.saturating_add(1)
    }

    /// Output groups: one per class for multiclass models, otherwise one.
    pub fn num_groups(&self) -> usize {
        self.header.num_tree_per_iteration.max(1)
    }
}

// =============================================================================
// Field access
// =============================================================================

#[derive(Default)]
struct Fields<'a> {
    map: HashMap<&'a str, &'a str>,
}

impl<'a> Fields<'a> {
    fn insert(&mut self, key: &'a str, value: &'a str) {
        self.map.insert(key, value);
    }

    fn scalar<T: FromStr>(&self, field: &'static str) -> Result<Option<T>, ParseError> {
        self.map
            .get(field)
            .map(|raw| {
                raw.trim().parse().map_err(|_| ParseError::InvalidValue {
                    field,
                    message: format!("cannot parse '{raw}'"),
                })
            })
            .transpose()
    }

    fn required<T: FromStr>(&self, field: &'static str) -> Result<T, ParseError> {
        self.scalar(field)?.ok_or(ParseError::MissingField(field))
    }

    fn array<T: FromStr>(&self, field: &'static str) -> Result<Option<Vec<T>>, ParseError> {
        self.map.get(field).map(|raw| parse_array(field, raw)).transpose()
    }

    /// Array that must be present with exactly `len` elements.
    fn sized_array<T: FromStr>(
        &self,
        field: &'static str,
        len: usize,
    ) -> Result<Vec<T>, ParseError> {
        let values = self.array(field)?.ok_or(ParseError::MissingField(field))?;
        validate_len(field, &values, len)?;
        Ok(values)
    }

    /// Optional array, filled with `fill` when absent.
    fn array_or<T: FromStr + Clone>(
        &self,
        field: &'static str,
        len: usize,
        fill: T,
    ) -> Result<Vec<T>, ParseError> {
        match self.array(field)? {
            Some(values) => {
                validate_len(field, &values, len)?;
                Ok(values)
            }
            None => Ok(vec![fill; len]),
        }
    }

    fn words(&self, field: &str) -> Vec<String> {
        self.map
            .get(field)
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn into_header(self, average_output: bool) -> Result<LgbHeader, ParseError> {
        let num_class: usize = self.required("num_class")?;
        let max_feature_idx: usize = self.required("max_feature_idx")?;
        if max_feature_idx > i32::MAX as usize {
            return Err(ParseError::InvalidValue {
                field: "max_feature_idx",
                message: format!("{max_feature_idx} exceeds the largest feature index"),
            });
        }
        let num_features = max_feature_idx + 1;

        let feature_names = self.words("feature_names");
        for (field, len) in [
            ("feature_names", feature_names.len()),
            ("feature_infos", self.words("feature_infos").len()),
        ] {
            if len > 0 {
                validate_count(field, len, num_features)?;
            }
        }

        Ok(LgbHeader {
            version: self.map.get("version").map(|v| v.to_string()).unwrap_or_default(),
            num_class,
            num_tree_per_iteration: self
                .scalar("num_tree_per_iteration")?
                .unwrap_or(num_class.max(1)),
            max_feature_idx,
            objective: self.map.get("objective").map(|v| v.trim().to_string()),
            average_output,
            feature_names,
        })
    }

    fn into_tree(self) -> Result<LgbTree, ParseError> {
        let num_leaves: usize = self.required("num_leaves")?;
        if num_leaves == 0 {
            return Err(ParseError::InvalidValue {
                field: "num_leaves",
                message: "tree has no leaves".to_string(),
            });
        }

        let mut tree = LgbTree {
            num_leaves,
            num_cat: self.scalar("num_cat")?.unwrap_or(0),
            shrinkage: self.scalar("shrinkage")?.unwrap_or(1.0),
            is_linear: self.scalar::<i32>("is_linear")?.unwrap_or(0) != 0,
            ..Default::default()
        };

        if num_leaves == 1 {
            tree.leaf_value = self.array("leaf_value")?.unwrap_or_else(|| vec![0.0]);
            validate_len("leaf_value", &tree.leaf_value, 1)?;
            return Ok(tree);
        }

        let num_splits = num_leaves - 1;
        tree.split_feature = self.sized_array("split_feature", num_splits)?;
        tree.threshold = self.sized_array("threshold", num_splits)?;
        tree.left_child = self.sized_array("left_child", num_splits)?;
        tree.right_child = self.sized_array("right_child", num_splits)?;
        tree.leaf_value = self.sized_array("leaf_value", num_leaves)?;
        // filled only once the required arrays have confirmed num_leaves
        tree.split_gain = self.array_or("split_gain", num_splits, 0.0)?;
        tree.decision_type = self.array_or("decision_type", num_splits, 0)?;

        if tree.num_cat > 0 {
            let num_boundaries = tree.num_cat.checked_add(1).ok_or_else(|| ParseError::InvalidValue {
                field: "num_cat",
                message: format!("{} is out of range", tree.num_cat),
            })?;
            tree.cat_boundaries = self.sized_array("cat_boundaries", num_boundaries)?;
            tree.cat_threshold = self.array("cat_threshold")?.unwrap_or_default();
        }

        Ok(tree)
    }
}

fn parse_array<T: FromStr>(field: &'static str, raw: &str) -> Result<Vec<T>, ParseError> {
    raw.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| ParseError::InvalidValue {
                field,
                message: format!("invalid element '{token}'"),
            })
        })
        .collect()
}

fn validate_len<T>(field: &'static str, values: &[T], expected: usize) -> Result<(), ParseError> {
    validate_count(field, values.len(), expected)
}

fn validate_count(field: &'static str, actual: usize, expected: usize) -> Result<(), ParseError> {
    if actual != expected {
        return Err(ParseError::ArraySizeMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = include_str!("../../../tests/test-cases/energy/model.txt");

    #[test]
    fn decode_decision_type() {
        let dt = DecisionType::from_bits(0);
        assert!(!dt.is_categorical);
        assert!(!dt.default_left);
        assert_eq!(dt.missing_type, MissingType::None);

        let dt = DecisionType::from_bits(2);
        assert!(dt.default_left);
        assert_eq!(dt.missing_type, MissingType::None);

        let dt = DecisionType::from_bits(1);
        assert!(dt.is_categorical);

        assert_eq!(DecisionType::from_bits(4).missing_type, MissingType::Zero);
        // default left + NaN missing, as written by LightGBM for most numerical splits
        let dt = DecisionType::from_bits(10);
        assert!(dt.default_left);
        assert_eq!(dt.missing_type, MissingType::NaN);
    }

    #[test]
    fn parse_energy_model() {
        let model = LgbModel::from_string(MODEL).unwrap();

        assert_eq!(model.header.version, "v4");
        assert_eq!(model.header.num_class, 1);
        assert_eq!(model.num_groups(), 1);
        assert_eq!(model.num_features(), 2);
        assert_eq!(model.header.feature_names, vec!["temp", "humidity"]);
        assert_eq!(model.header.objective.as_deref(), Some("regression"));
        assert!(!model.header.average_output);
        assert_eq!(model.trees.len(), 2);

        let tree0 = &model.trees[0];
        assert_eq!(tree0.num_leaves, 3);
        assert_eq!(tree0.split_feature, vec![0, 1]);
        assert_eq!(tree0.left_child, vec![-1, -2]);
        assert_eq!(tree0.right_child, vec![1, -3]);
        assert_eq!(tree0.leaf_value, vec![10.0, 20.0, 30.0]);

        let tree1 = &model.trees[1];
        assert_eq!(tree1.num_leaves, 2);
        assert!((tree1.shrinkage - 0.1).abs() < 1e-12);
    }

    #[test]
    fn single_leaf_tree_needs_no_split_arrays() {
        let text = "tree\nnum_class=1\nmax_feature_idx=0\n\nTree=0\nnum_leaves=1\nleaf_value=0.25\nshrinkage=1\n\nend of trees\n";
        let model = LgbModel::from_string(text).unwrap();
        assert_eq!(model.trees[0].leaf_value, vec![0.25]);
        assert!(model.trees[0].split_feature.is_empty());
    }

    #[test]
    fn average_output_flag() {
        let text = "tree\nnum_class=1\nmax_feature_idx=0\naverage_output\n\nTree=0\nnum_leaves=1\nleaf_value=1\n\nend of trees\n";
        let model = LgbModel::from_string(text).unwrap();
        assert!(model.header.average_output);
    }

    #[test]
    fn missing_header_field() {
        let text = "tree\nmax_feature_idx=0\n\nTree=0\nnum_leaves=1\nleaf_value=1\n";
        let err = LgbModel::from_string(text).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("num_class")));
    }

    #[test]
    fn rejects_invalid_array_element() {
        let text = MODEL.replace("threshold=15.5 0.59999999999999998", "threshold=15.5 nope");
        let err = LgbModel::from_string(&text).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { field: "threshold", .. }));
    }

    #[test]
    fn rejects_short_array() {
        let text = MODEL.replace("leaf_value=10 20 30", "leaf_value=10 20");
        let err = LgbModel::from_string(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ArraySizeMismatch { field: "leaf_value", expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn empty_document_has_no_trees() {
        let err = LgbModel::from_string("tree\nnum_class=1\nmax_feature_idx=3\n").unwrap_err();
        assert!(matches!(err, ParseError::NoTrees));
    }

    #[test]
    fn max_feature_idx_out_of_range() {
        for idx in ["18446744073709551615", "1000000000000000"] {
            let text = format!(
                "tree\nnum_class=1\nmax_feature_idx={idx}\n\nTree=0\nnum_leaves=1\nleaf_value=1\n\nend of trees\n"
            );
            let err = LgbModel::from_string(&text).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidValue { field: "max_feature_idx", .. }),
                "{idx}: {err}"
            );
        }
    }

    #[test]
    fn feature_names_must_match_feature_count() {
        let text = MODEL.replace("max_feature_idx=1", "max_feature_idx=4");
        let err = LgbModel::from_string(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ArraySizeMismatch { field: "feature_names", expected: 5, actual: 2 }
        ));

        let text = MODEL.replace("feature_infos=[-5.2:41.7] [0.05:0.98]", "feature_infos=[-5.2:41.7]");
        let err = LgbModel::from_string(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ArraySizeMismatch { field: "feature_infos", expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn num_cat_out_of_range() {
        let text = MODEL.replacen("num_cat=0", "num_cat=18446744073709551615", 1);
        let err = LgbModel::from_string(&text).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { field: "num_cat", .. }));
    }

    #[test]
    fn huge_num_leaves_is_a_size_mismatch() {
        let text = MODEL.replacen("num_leaves=3", "num_leaves=1000000000000000", 1);
        let err = LgbModel::from_string(&text).unwrap_err();
        assert!(matches!(err, ParseError::ArraySizeMismatch { field: "split_feature", .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LgbModel::from_file("/nonexistent/model.txt").unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
