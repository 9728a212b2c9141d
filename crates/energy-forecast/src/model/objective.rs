//! Output transforms for LightGBM objectives.
//!
//! Trees produce raw margins; `predict` maps them to the objective's output
//! space the way LightGBM's default (non-raw) prediction does.

/// Objective of a loaded model, reduced to what prediction needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    /// Raw margin is the prediction (L2, L1, huber, quantile, ranking, ...).
    Identity,
    /// Regression trained on `sqrt(label)`: output is `sign(x) * x²`.
    SquareRoot,
    /// Log-link objectives (poisson, gamma, tweedie).
    Exp,
    /// Binary log loss and one-vs-all multiclass.
    Sigmoid { scale: f64 },
    /// Cross-entropy with probability labels.
    CrossEntropy,
    /// Cross-entropy in the alternative parameterization.
    CrossEntropyLambda,
    Softmax { num_class: usize },
}

impl Objective {
    /// Parse the header `objective=` line, e.g. `binary sigmoid:1`.
    ///
    /// Unknown objectives fall back to [`Objective::Identity`].
    pub fn parse(raw: &str) -> Self {
        let mut tokens = raw.split_whitespace();
        let name = tokens.next().unwrap_or("");
        let params: Vec<&str> = tokens.collect();
        let param = |key: &str| {
            params
                .iter()
                .find_map(|p| p.strip_prefix(key).and_then(|v| v.strip_prefix(':')))
        };

        match name {
            _ if is_regression(name) && params.contains(&"sqrt") => Objective::SquareRoot,
            "poisson" | "gamma" | "tweedie" => Objective::Exp,
            "binary" | "multiclassova" => Objective::Sigmoid {
                scale: param("sigmoid").and_then(|v| v.parse().ok()).unwrap_or(1.0),
            },
            "cross_entropy" | "xentropy" => Objective::CrossEntropy,
            "cross_entropy_lambda" | "xentlambda" => Objective::CrossEntropyLambda,
            "multiclass" | "softmax" => Objective::Softmax {
                num_class: param("num_class").and_then(|v| v.parse().ok()).unwrap_or(1),
            },
            _ => Objective::Identity,
        }
    }

    /// Transform the raw scores of one row (one value per output group).
    pub fn transform(&self, scores: &mut [f64]) {
        match self {
            Objective::Identity => {}
            Objective::SquareRoot => scores.iter_mut().for_each(|x| *x = x.signum() * *x * *x),
            Objective::Exp => scores.iter_mut().for_each(|x| *x = x.exp()),
            Objective::Sigmoid { scale } => scores
                .iter_mut()
                .for_each(|x| *x = 1.0 / (1.0 + (-scale * *x).exp())),
            Objective::CrossEntropy => scores
                .iter_mut()
                .for_each(|x| *x = 1.0 / (1.0 + (-*x).exp())),
            Objective::CrossEntropyLambda => scores.iter_mut().for_each(|x| *x = x.exp().ln_1p()),
            Objective::Softmax { .. } => softmax(scores),
        }
    }
}

/// Objectives sharing the L2 output conversion, including its `sqrt` option.
fn is_regression(name: &str) -> bool {
    matches!(
        name,
        "regression"
            | "regression_l2"
            | "l2"
            | "mean_squared_error"
            | "mse"
            | "l2_root"
            | "root_mean_squared_error"
            | "rmse"
            | "regression_l1"
            | "l1"
            | "mean_absolute_error"
            | "mae"
            | "huber"
            | "fair"
            | "quantile"
            | "mape"
            | "mean_absolute_percentage_error"
    )
}

fn softmax(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for x in scores.iter_mut() {
        *x = (*x - max).exp();
        total += *x;
    }
    scores.iter_mut().for_each(|x| *x /= total);
}
