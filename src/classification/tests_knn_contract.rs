// =========================================================================
// KNN classifier contract
//
// Properties checked here:
//   - the prediction is one of the known labels
//   - confidences cover every class and sum to 1
//   - votes come from the k most cosine-similar examples
//   - similarity and vote ties resolve to the earlier example/class
//   - the normalized cache is rebuilt after every mutation
//   - loaded example sets are checked like set_classifier_dataset input
//
// References:
//   - Cover & Hart (1967) "Nearest Neighbor Pattern Classification"
// =========================================================================

use super::*;

fn two_class() -> KnnClassifier {
    let mut knn = KnnClassifier::new();
    for v in [[1.0, 0.0], [0.9, 0.1], [0.95, 0.05]] {
        knn.add_example(&v, "east").expect("add");
    }
    for v in [[0.0, 1.0], [0.1, 0.9]] {
        knn.add_example(&v, "north").expect("add");
    }
    knn
}

/// Prediction is a known label and its index matches insertion order
#[test]
fn knn_prediction_is_known_label() {
    let mut knn = two_class();
    let p = knn.predict_class(&[0.2, 3.0], 3).expect("predict");
    assert_eq!(p.label, "north");
    assert_eq!(p.class_index, 1);

    let p = knn.predict_class(&[5.0, 0.1], 3).expect("predict");
    assert_eq!(p.label, "east");
    assert_eq!(p.class_index, 0);
}

/// Confidences list every class and sum to 1
#[test]
fn knn_confidences_sum_to_one() {
    let mut knn = two_class();
    let p = knn.predict_class(&[0.6, 0.5], 4).expect("predict");
    assert_eq!(p.confidences.len(), 2);
    let total: f32 = p.confidences.values().sum();
    assert!((total - 1.0).abs() < 1e-6, "sum = {total}");
    for &c in p.confidences.values() {
        assert!((0.0..=1.0).contains(&c));
    }
}

/// Cosine similarity ignores magnitude
#[test]
fn knn_similarity_is_scale_invariant() {
    let mut knn = two_class();
    let small = knn.predict_class(&[0.01, 0.0], 1).expect("predict");
    let large = knn.predict_class(&[100.0, 0.0], 1).expect("predict");
    assert_eq!(small, large);
    assert_eq!(small.confidences["east"], 1.0);
}

/// k larger than the example count uses every example
#[test]
fn knn_k_clamped_to_examples() {
    let mut knn = two_class();
    let p = knn.predict_class(&[0.0, 1.0], 50).expect("predict");
    // 3 east, 2 north
    assert_eq!(p.label, "east");
    assert!((p.confidences["east"] - 0.6).abs() < 1e-6);
    assert!((p.confidences["north"] - 0.4).abs() < 1e-6);
}

/// Vote ties go to the lower class index
#[test]
fn knn_vote_tie_prefers_first_class() {
    let mut knn = KnnClassifier::new();
    knn.add_example(&[1.0, 0.0], "b").expect("add");
    knn.add_example(&[0.0, 1.0], "a").expect("add");
    let p = knn.predict_class(&[1.0, 1.0], 2).expect("predict");
    assert_eq!(p.class_index, 0);
    assert_eq!(p.label, "b");
    assert_eq!(p.confidences["a"], 0.5);
}

/// Equal similarity prefers the example added first
#[test]
fn knn_similarity_tie_prefers_earlier_example() {
    let mut knn = KnnClassifier::new();
    knn.add_example(&[2.0, 0.0], "first").expect("add");
    knn.add_example(&[1.0, 0.0], "second").expect("add");
    let p = knn.predict_class(&[3.0, 0.0], 1).expect("predict");
    assert_eq!(p.label, "first");
}

/// A zero vector has similarity 0 to everything and still gets a label
#[test]
fn knn_zero_vectors() {
    let mut knn = KnnClassifier::new();
    knn.add_example(&[0.0, 0.0], "zero").expect("add");
    knn.add_example(&[-1.0, 0.0], "west").expect("add");
    let p = knn.predict_class(&[1.0, 0.0], 1).expect("predict");
    // similarity: zero -> 0, west -> -1
    assert_eq!(p.label, "zero");

    let p = knn.predict_class(&[0.0, 0.0], 1).expect("predict");
    assert_eq!(p.label, "zero");
}

#[test]
fn knn_predict_without_examples_is_invalid_state() {
    let mut knn = KnnClassifier::new();
    let err = knn.predict_class(&[1.0], 1).expect_err("empty");
    assert!(matches!(err, AgruparError::InvalidState { .. }));
}

#[test]
fn knn_k_zero_is_invalid_argument() {
    let mut knn = two_class();
    let err = knn.predict_class(&[1.0, 0.0], 0).expect_err("k = 0");
    assert!(matches!(err, AgruparError::InvalidArgument { .. }));
}

#[test]
fn knn_width_is_fixed_by_first_example() {
    let mut knn = two_class();
    assert_eq!(knn.n_features(), Some(2));
    let err = knn.add_example(&[1.0, 2.0, 3.0], "east").expect_err("width");
    assert!(matches!(err, AgruparError::DimensionMismatch { .. }));
    let err = knn.predict_class(&[1.0], 1).expect_err("width");
    assert!(matches!(err, AgruparError::DimensionMismatch { .. }));
    assert_eq!(knn.num_examples(), 5);
}

#[test]
fn knn_rejects_non_finite() {
    let mut knn = two_class();
    assert!(knn.add_example(&[f32::NAN, 0.0], "east").is_err());
    assert!(knn.add_example(&[], "east").is_err());
    assert!(knn.predict_class(&[f32::INFINITY, 0.0], 1).is_err());
}

/// The cache is built lazily and dropped on every mutation
#[test]
fn knn_cache_invalidation() {
    let mut knn = two_class();
    assert!(!knn.is_cached());
    knn.predict_class(&[1.0, 0.0], 1).expect("predict");
    assert!(knn.is_cached());

    knn.add_example(&[-1.0, -1.0], "southwest").expect("add");
    assert!(!knn.is_cached());
    let p = knn.predict_class(&[-2.0, -2.1], 1).expect("predict");
    assert_eq!(p.label, "southwest");
    assert_eq!(p.class_index, 2);

    assert!(knn.clear_class("east"));
    assert!(!knn.is_cached());
    let p = knn.predict_class(&[-2.0, -2.1], 1).expect("predict");
    assert_eq!(p.class_index, 1);
}

#[test]
fn knn_clear_classes() {
    let mut knn = two_class();
    assert_eq!(knn.num_classes(), 2);
    assert!(!knn.clear_class("missing"));
    assert!(knn.clear_class("north"));
    assert_eq!(knn.num_classes(), 1);
    assert_eq!(knn.class_example_count()["east"], 3);

    knn.clear_all_classes();
    assert_eq!(knn.num_classes(), 0);
    assert_eq!(knn.n_features(), None);
    // Width is free again
    knn.add_example(&[1.0, 2.0, 3.0], "x").expect("new width");
}

#[test]
fn knn_dataset_round_trip() {
    let knn = two_class();
    let dataset = knn.classifier_dataset().expect("whole rows");
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset[0].0, "east");
    assert_eq!(dataset[0].1.shape(), (3, 2));
    assert_eq!(dataset[1].1.row_slice(1), &[0.1, 0.9]);

    let mut restored = KnnClassifier::new();
    restored.set_classifier_dataset(dataset).expect("consistent");
    assert_eq!(restored.class_example_count(), knn.class_example_count());
    assert_eq!(restored.n_features(), Some(2));
}

#[test]
fn knn_set_dataset_validates() {
    let mut knn = two_class();
    let a = Matrix::from_vec(1, 2, vec![1.0, 0.0]).expect("1x2");
    let b = Matrix::from_vec(1, 3, vec![1.0, 0.0, 0.0]).expect("1x3");
    let err = knn
        .set_classifier_dataset(vec![("a".into(), a.clone()), ("b".into(), b)])
        .expect_err("widths differ");
    assert!(matches!(err, AgruparError::DimensionMismatch { .. }));

    let err = knn
        .set_classifier_dataset(vec![("a".into(), a.clone()), ("a".into(), a)])
        .expect_err("duplicate");
    assert!(matches!(err, AgruparError::InvalidArgument { .. }));

    // Unchanged on error
    assert_eq!(knn.num_examples(), 5);
}

#[test]
fn knn_save_and_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("knn.json");
    let mut knn = two_class();
    knn.save(&path).expect("save");

    let mut loaded = KnnClassifier::load(&path).expect("load");
    assert_eq!(loaded.class_example_count(), knn.class_example_count());
    assert_eq!(
        loaded.predict_class(&[0.0, 1.0], 2).expect("predict"),
        knn.predict_class(&[0.0, 1.0], 2).expect("predict")
    );
}

/// A saved file whose counts disagree with its data is rejected on load
#[test]
fn knn_load_rejects_inconsistent_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("knn.json");
    // Class "a" claims one row but holds two; class "b" claims one and holds none
    std::fs::write(
        &path,
        r#"{"classes":[{"label":"a","data":[1,0,0,1],"count":1},{"label":"b","data":[],"count":1}],"n_features":2}"#,
    )
    .expect("write");

    let err = KnnClassifier::load(&path).expect_err("counts do not match data");
    assert!(matches!(err, AgruparError::DimensionMismatch { .. }));
}

#[test]
fn knn_load_rejects_duplicate_labels_and_zero_width() {
    let dir = tempfile::tempdir().expect("tempdir");

    let duplicate = dir.path().join("duplicate.json");
    std::fs::write(
        &duplicate,
        r#"{"classes":[{"label":"a","data":[1,0],"count":1},{"label":"a","data":[0,1],"count":1}],"n_features":2}"#,
    )
    .expect("write");
    let err = KnnClassifier::load(&duplicate).expect_err("duplicate label");
    assert!(matches!(err, AgruparError::InvalidArgument { .. }));

    let zero_width = dir.path().join("zero_width.json");
    std::fs::write(
        &zero_width,
        r#"{"classes":[{"label":"a","data":[],"count":2}],"n_features":null}"#,
    )
    .expect("write");
    let err = KnnClassifier::load(&zero_width).expect_err("no features");
    assert!(matches!(err, AgruparError::InvalidArgument { .. }));
}

/// Plain serde deserialization goes through the same checks
#[test]
fn knn_deserialize_validates() {
    let json = r#"{"classes":[{"label":"a","data":[1,0,0],"count":1}],"n_features":2}"#;
    assert!(serde_json::from_str::<KnnClassifier>(json).is_err());

    let json = r#"{"classes":[{"label":"a","data":[1,0,0,1],"count":2}],"n_features":2}"#;
    let mut knn: KnnClassifier = serde_json::from_str(json).expect("consistent");
    assert_eq!(knn.num_examples(), 2);
    assert_eq!(knn.predict_class(&[0.0, 3.0], 1).expect("predict").label, "a");
}
