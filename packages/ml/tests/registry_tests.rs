//! Registry and prediction tests against the artifacts checked in at the repository root.

use iris_ml::{ArtifactError, FeatureVector, ModelRegistry, PredictionError, PredictionService};
use iris_types::json::{self, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn artifact_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts")
}

fn service() -> PredictionService {
    let registry = ModelRegistry::load(artifact_dir()).expect("artifacts should load");
    PredictionService::new(Arc::new(registry))
}

/// Copies the shipped artifacts so a test can break one of them.
fn copy_artifacts(to: &Path) {
    for entry in std::fs::read_dir(artifact_dir()).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), to.join(entry.file_name())).unwrap();
    }
}

#[test]
fn test_registry_lists_models_in_metadata_order() {
    let registry = ModelRegistry::load(artifact_dir()).unwrap();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(names, vec!["decision_tree", "logistic_regression"]);

    let models = registry.list();
    assert!(!models[0].requires_scaling);
    assert!(models[1].requires_scaling);
    assert_eq!(models[0].metrics.test_accuracy, 0.9667);
    assert_eq!(registry.list(), models);
    assert_eq!(
        registry.labels().iter().collect::<Vec<_>>(),
        vec!["setosa", "versicolor", "virginica"]
    );
}

#[test]
fn test_metadata_is_kept_verbatim() {
    let registry = ModelRegistry::load(artifact_dir()).unwrap();
    let on_disk: iris_types::Value =
        json::from_slice(&std::fs::read(artifact_dir().join("metadata.json")).unwrap()).unwrap();
    assert_eq!(registry.metadata(), &on_disk);
    assert_eq!(registry.metadata()["dataset"], json!("Iris"));
}

#[test]
fn test_decision_tree_scenarios() {
    let service = service();

    let setosa = service
        .predict(&FeatureVector::from([5.1, 3.5, 1.4, 0.2]), "decision_tree")
        .unwrap();
    assert_eq!(setosa.prediction, "setosa");
    assert_eq!(setosa.prediction_index, 0);
    assert_eq!(setosa.confidence, 1.0);

    let versicolor = service
        .predict(&FeatureVector::from([6.3, 2.9, 4.7, 1.4]), "decision_tree")
        .unwrap();
    assert_eq!(versicolor.prediction, "versicolor");
    assert_eq!(versicolor.prediction_index, 1);
    assert_eq!(versicolor.model_used, "decision_tree");
}

#[test]
fn test_logistic_regression_scenario() {
    let result = service()
        .predict(&FeatureVector::from([7.2, 3.0, 5.8, 1.6]), "logistic_regression")
        .unwrap();
    assert_eq!(result.prediction, "virginica");
    assert_eq!(result.prediction_index, 2);
    assert_eq!(result.model_used, "logistic_regression");
}

#[test]
fn test_distribution_invariants_hold_for_every_model() {
    let service = service();
    let samples = [
        [5.1, 3.5, 1.4, 0.2],
        [4.9, 3.0, 1.4, 0.2],
        [6.3, 2.9, 4.7, 1.4],
        [5.9, 3.0, 5.1, 1.8],
        [7.2, 3.0, 5.8, 1.6],
        [6.0, 2.7, 5.1, 1.6],
        [0.1, 0.1, 0.1, 0.1],
        [9.9, 9.9, 9.9, 9.9],
    ];
    let labels = ["setosa", "versicolor", "virginica"];

    for name in ["decision_tree", "logistic_regression"] {
        for sample in samples {
            let result = service.predict(&FeatureVector::from(sample), name).unwrap();
            assert!(labels.contains(&result.prediction.as_str()));
            assert_eq!(labels[result.prediction_index], result.prediction);

            let keys: Vec<_> = result.probabilities.iter().map(|(l, _)| l).collect();
            assert_eq!(keys, labels);

            let total: f64 = result.probabilities.iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() <= 1e-6, "{name} {sample:?} sums to {total}");

            let max = result
                .probabilities
                .iter()
                .map(|(_, p)| p)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(result.confidence, max);
            assert_eq!(
                result.probabilities.get(&result.prediction),
                Some(result.confidence)
            );
        }
    }
}

#[test]
fn test_predictions_are_deterministic() {
    let service = service();
    let features = FeatureVector::from([5.9, 3.0, 5.1, 1.8]);
    let first = service.predict(&features, "logistic_regression").unwrap();
    for _ in 0..10 {
        assert_eq!(service.predict(&features, "logistic_regression").unwrap(), first);
    }
}

#[test]
fn test_unknown_model_is_a_client_error() {
    let err = service()
        .predict(&FeatureVector::from([5.1, 3.5, 1.4, 0.2]), "random_forest")
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(
        err.to_string(),
        "Invalid model: random_forest. Choose one of: decision_tree, logistic_regression"
    );
    assert!(matches!(err, PredictionError::UnknownModel { .. }));
}

#[test]
fn test_huge_features_are_rejected_not_failed() {
    let service = service();
    let huge = FeatureVector::from([1e308; 4]);

    let err = service.predict(&huge, "logistic_regression").unwrap_err();
    assert!(err.is_client_error(), "{err}");
    assert!(matches!(err, PredictionError::InvalidRequest(_)));

    let result = service.predict(&huge, "decision_tree").unwrap();
    assert_eq!(result.prediction, "virginica");

    let large = FeatureVector::from([1e200; 4]);
    assert!(service.predict(&large, "logistic_regression").is_ok());
}

#[test]
fn test_result_serializes_probabilities_as_ordered_object() {
    let result = service()
        .predict(&FeatureVector::from([5.1, 3.5, 1.4, 0.2]), "decision_tree")
        .unwrap();
    let value = json::to_value(&result).unwrap();
    assert_eq!(
        value,
        json!({
            "prediction": "setosa",
            "prediction_index": 0,
            "probabilities": {"setosa": 1.0, "versicolor": 0.0, "virginica": 0.0},
            "model_used": "decision_tree",
            "confidence": 1.0
        })
    );
    let keys: Vec<_> = value["probabilities"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["setosa", "versicolor", "virginica"]);

    let back: iris_ml::PredictionResult = json::from_value(value).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_batch_reports_each_item() {
    let features = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    });
    let items = vec![
        json!({"features": features.clone(), "model": "decision_tree"}),
        json!({"features": features, "model": "svm"}),
        json!({"features": {"sepal_length": 5.1}, "model": "decision_tree"}),
    ];
    let results = service().predict_batch(items);
    assert_eq!(results.len(), 3);
    assert!(results[0].success);
    assert_eq!(results[0].result.as_ref().unwrap().prediction, "setosa");
    assert!(!results[1].success);
    assert!(results[1].error.as_ref().unwrap().starts_with("Invalid model: svm"));
    assert!(!results[2].success);
    assert!(results[2].error.as_ref().unwrap().contains("sepal_width"));
}

#[test]
fn test_missing_artifact_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    copy_artifacts(dir.path());
    std::fs::remove_file(dir.path().join("logistic_regression_model.json")).unwrap();

    let err = ModelRegistry::load(dir.path()).unwrap_err();
    match err {
        ArtifactError::Missing(path) => {
            assert!(path.ends_with("logistic_regression_model.json"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_corrupt_artifact_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    copy_artifacts(dir.path());
    std::fs::write(dir.path().join("scaler.json"), b"\x80\x04pickle").unwrap();

    assert!(matches!(
        ModelRegistry::load(dir.path()),
        Err(ArtifactError::Decode { .. })
    ));
}

#[test]
fn test_class_count_mismatch_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    copy_artifacts(dir.path());
    let mut metadata: iris_types::Value =
        json::from_slice(&std::fs::read(dir.path().join("metadata.json")).unwrap()).unwrap();
    metadata["target_names"] = json!(["setosa", "versicolor"]);
    std::fs::write(
        dir.path().join("metadata.json"),
        json::to_vec(&metadata).unwrap(),
    )
    .unwrap();

    assert!(matches!(
        ModelRegistry::load(dir.path()),
        Err(ArtifactError::Inconsistent(_))
    ));
}

#[test]
fn test_missing_directory_fails_load() {
    let err = ModelRegistry::load(artifact_dir().join("does-not-exist")).unwrap_err();
    assert!(matches!(err, ArtifactError::MissingDirectory(_)));
}
