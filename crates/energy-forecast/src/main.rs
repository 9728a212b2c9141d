//! energy-forecast - load a deployed model and report on it.
//!
//! Usage: `energy-forecast <config.toml> [records.json]`
//!
//! Prints the gain importance table and, when a records file (a JSON array
//! of objects mapping feature name to value) is given, the predictions for
//! those records as a JSON array.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use energy_forecast::{logging, AppConfig, LabeledFrame, Predictor};
use tracing::info;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .context("usage: energy-forecast <config.toml> [records.json]")?;
    let records_path = args.next();

    let config = AppConfig::load_from_path(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;
    logging::init(&config.logging)?;

    let predictor = Predictor::from_config(&config.predictor)?;

    let importance = predictor
        .get_feature_importance()
        .context("failed to compute feature importance")?;
    println!("{importance}");

    if let Some(path) = records_path {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read records from {path}"))?;
        let records: Vec<BTreeMap<String, Option<f64>>> = serde_json::from_str(&content)
            .with_context(|| format!("records in {path} must be a JSON array of objects"))?;

        let frame = LabeledFrame::from_records(&records);
        let predictions = predictor.predict(&frame)?;
        info!(rows = predictions.len(), "Predictions complete");

        println!("{}", serde_json::to_string_pretty(&predictions.to_vec())?);
    }

    Ok(())
}
