//! End-to-end tests for loading a deployed model and querying it.

use std::io::Write;

use approx::assert_abs_diff_eq;
use ndarray::{arr2, Array2};
use rstest::rstest;

use energy_forecast::{LabeledFrame, Predictor, PredictorConfig, PredictorError};

/// Directory holding the energy model fixture.
const TEST_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/test-cases/energy");

fn model_path() -> String {
    format!("{TEST_DIR}/model.txt")
}

fn metadata_path() -> String {
    format!("{TEST_DIR}/metadata.json")
}

fn load() -> Predictor {
    Predictor::load(model_path(), metadata_path()).expect("fixture predictor should load")
}

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

mod loading {
    use super::*;

    #[test]
    fn exposes_training_feature_order() {
        let predictor = load();
        assert_eq!(predictor.feature_names(), ["temp", "humidity"]);
        assert_eq!(predictor.n_features(), 2);
        assert_abs_diff_eq!(predictor.metadata().test_rmse(), 12.34);
        assert_eq!(predictor.ensemble().n_trees(), 2);
    }

    #[test]
    fn from_config_matches_load() {
        let config = PredictorConfig::builder()
            .model_path(model_path())
            .metadata_path(metadata_path())
            .n_threads(2)
            .build()
            .unwrap();
        let predictor = Predictor::from_config(&config).unwrap();

        let rows = arr2(&[[20.0, 0.5], [10.0, 0.9]]);
        assert_eq!(
            predictor.predict(&rows).unwrap(),
            load().predict(&rows).unwrap()
        );
    }

    #[test]
    fn missing_model_file() {
        let err = Predictor::load(format!("{TEST_DIR}/absent.txt"), metadata_path()).unwrap_err();
        match err {
            PredictorError::ModelLoad { path, .. } => assert!(path.ends_with("absent.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparsable_model_file() {
        let model = write_temp("tree\nversion=v4\nmax_feature_idx=1\n\nend of trees\n", ".txt");
        let err = Predictor::load(model.path(), metadata_path()).unwrap_err();
        assert!(matches!(err, PredictorError::ModelLoad { .. }));
    }

    #[rstest]
    #[case::overflowing_feature_index("max_feature_idx=18446744073709551615")]
    #[case::oversized_feature_index("max_feature_idx=1000000000000000")]
    fn out_of_range_header_fails_to_load(#[case] header: &str) {
        let model = write_temp(
            &format!("tree\nnum_class=1\n{header}\n\nTree=0\nnum_leaves=1\nleaf_value=1\n\nend of trees\n"),
            ".txt",
        );
        let err = Predictor::load(model.path(), metadata_path()).unwrap_err();
        assert!(matches!(err, PredictorError::ModelLoad { .. }), "{err}");
    }

    #[test]
    fn missing_metadata_file() {
        let err = Predictor::load(model_path(), format!("{TEST_DIR}/absent.json")).unwrap_err();
        assert!(matches!(err, PredictorError::MetadataLoad { .. }));
    }

    #[test]
    fn malformed_metadata_json() {
        let metadata = write_temp("{ \"feature_names\": [\"temp\", ", ".json");
        let err = Predictor::load(model_path(), metadata.path()).unwrap_err();
        assert!(matches!(err, PredictorError::MetadataLoad { .. }));
    }

    #[rstest]
    #[case::no_feature_names(r#"{ "performance_metrics": { "test_rmse": 1.0 } }"#)]
    #[case::no_metrics(r#"{ "feature_names": ["temp", "humidity"] }"#)]
    #[case::no_test_rmse(r#"{ "feature_names": ["temp"], "performance_metrics": { "test_mae": 1.0 } }"#)]
    fn metadata_missing_keys(#[case] document: &str) {
        let metadata = write_temp(document, ".json");
        let err = Predictor::load(model_path(), metadata.path()).unwrap_err();
        assert!(matches!(err, PredictorError::MetadataSchema { .. }), "{err}");
    }
}

mod predict {
    use super::*;

    #[rstest]
    #[case([20.0, 0.5], 22.5)]
    #[case([10.0, 0.9], 12.5)]
    #[case([20.0, 0.7], 32.5)]
    #[case([20.0, 0.2], 18.5)]
    #[case([15.5, 0.6], 12.5)]
    fn known_rows(#[case] row: [f64; 2], #[case] expected: f64) {
        let frame = LabeledFrame::new(
            vec!["temp".into(), "humidity".into()],
            arr2(&[row]),
        )
        .unwrap();
        let preds = load().predict(&frame).unwrap();
        assert_eq!(preds.len(), 1);
        assert_abs_diff_eq!(preds[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn column_order_and_extra_columns_are_ignored() {
        let predictor = load();
        let ordered = LabeledFrame::new(
            vec!["temp".into(), "humidity".into()],
            arr2(&[[20.0, 0.5], [10.0, 0.9]]),
        )
        .unwrap();
        let shuffled = LabeledFrame::new(
            vec!["hour".into(), "humidity".into(), "temp".into()],
            arr2(&[[7.0, 0.5, 20.0], [23.0, 0.9, 10.0]]),
        )
        .unwrap();

        let expected = predictor.predict(&ordered).unwrap();
        assert_eq!(predictor.predict(&shuffled).unwrap(), expected);
        assert_eq!(expected.to_vec(), vec![22.5, 12.5]);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let frame = LabeledFrame::new(vec!["temp".into()], arr2(&[[20.0]])).unwrap();
        let err = load().predict(&frame).unwrap_err();

        assert_eq!(err.to_string(), "missing required feature column(s): humidity");
        match err {
            PredictorError::MissingFeature { missing } => assert_eq!(missing, ["humidity"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_frame_yields_empty_predictions() {
        let frame = LabeledFrame::new(
            vec!["humidity".into(), "temp".into()],
            Array2::zeros((0, 2)),
        )
        .unwrap();
        assert!(load().predict(&frame).unwrap().is_empty());
    }

    #[test]
    fn records_with_gaps_become_missing_values() {
        let records: Vec<std::collections::BTreeMap<String, Option<f64>>> = serde_json::from_str(
            r#"[
                { "temp": 20.0, "humidity": 0.5 },
                { "temp": 20.0, "humidity": null },
                { "humidity": 0.9, "temp": 10.0, "hour": 3 }
            ]"#,
        )
        .unwrap();
        let frame = LabeledFrame::from_records(&records);

        let preds = load().predict(&frame).unwrap();

        // NaN humidity is treated as 0.0 by numerical splits without NaN handling
        assert_eq!(preds.to_vec(), vec![22.5, 18.5, 12.5]);
    }

    #[test]
    fn raw_matrix_is_used_as_given() {
        let predictor = load();
        let preds = predictor.predict(&arr2(&[[20.0, 0.5]])).unwrap();
        assert_eq!(preds.to_vec(), vec![22.5]);

        // swapped columns are not detected for raw input
        let swapped = predictor.predict(&arr2(&[[0.5, 20.0]])).unwrap();
        assert_eq!(swapped.to_vec(), vec![12.5]);
    }

    #[test]
    fn raw_matrix_of_wrong_width_fails() {
        let err = load().predict(&arr2(&[[20.0, 0.5, 1.0]])).unwrap_err();
        assert!(matches!(err, PredictorError::Inference(_)));
    }

    #[test]
    fn repeated_calls_agree() {
        let predictor = load();
        let rows = arr2(&[[20.0, 0.7], [3.0, 0.1]]);
        assert_eq!(predictor.predict(&rows).unwrap(), predictor.predict(&rows).unwrap());
    }
}

mod importance {
    use super::*;

    #[test]
    fn gain_importance_sorted_descending() {
        let table = load().get_feature_importance().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.features().collect::<Vec<_>>(), vec!["temp", "humidity"]);
        assert_abs_diff_eq!(table.rows()[0].importance, 120.5);
        assert_abs_diff_eq!(table.rows()[1].importance, 56.0);
    }

    #[test]
    fn is_stable_across_calls() {
        let predictor = load();
        assert_eq!(
            predictor.get_feature_importance().unwrap(),
            predictor.get_feature_importance().unwrap()
        );
    }

    #[test]
    fn serializes_as_feature_importance_records() {
        let table = load().get_feature_importance().unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "Feature": "temp", "Importance": 120.5 },
                { "Feature": "humidity", "Importance": 56.0 }
            ])
        );
    }
}
