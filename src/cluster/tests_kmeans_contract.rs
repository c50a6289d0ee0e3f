// =========================================================================
// K-Means kernel contract
//
// Properties checked here:
//   - initial centroids are k distinct sample rows
//   - assignment is in range and minimal by brute force
//   - assignment is deterministic
//   - update/assign fixed points are stable
//   - worked examples for assign and update, including an empty cluster
//
// References:
//   - Lloyd (1982) "Least Squares Quantization in PCM"
// =========================================================================

use super::assign::assign_to_nearest;
use super::init::init_centroids;
use super::update::update_centroids;
use super::*;
use crate::error::AgruparError;
use crate::primitives::Matrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn line(n: usize) -> Matrix<f32> {
    Matrix::from_vec(n, 1, (1..=n).map(|v| v as f32).collect()).expect("valid matrix")
}

fn blobs() -> Matrix<f32> {
    Matrix::from_vec(
        9,
        2,
        vec![
            0.0, 0.0, 0.4, 0.1, 0.2, 0.3, 6.0, 6.0, 6.3, 5.8, 5.9, 6.2, 12.0, 0.0, 12.2, 0.4,
            11.8, 0.1,
        ],
    )
    .expect("valid matrix")
}

/// Init: shape (k, d), rows are distinct rows of X
#[test]
fn kmeans_init_rows_are_distinct_samples() {
    let x = blobs();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let centroids = init_centroids(&x, 4, &mut rng).expect("4 <= 9");
        assert_eq!(centroids.shape(), (4, 2));

        let mut matched = Vec::new();
        for c in 0..4 {
            let row = (0..x.n_rows())
                .find(|&i| x.row_slice(i) == centroids.row_slice(c))
                .unwrap_or_else(|| panic!("centroid {c} is not a sample row (seed {seed})"));
            matched.push(row);
        }
        matched.sort_unstable();
        matched.dedup();
        assert_eq!(matched.len(), 4, "seed {seed}: repeated sample row");
    }
}

/// Assign: labels in [0, k) and minimal by brute force
#[test]
fn kmeans_assignment_is_nearest() {
    let x = blobs();
    let centroids = Matrix::from_vec(3, 2, vec![1.0, 1.0, 5.0, 5.0, 10.0, 1.0]).expect("3x2");
    let labels = assign_to_nearest(&x, &centroids).expect("compatible");
    assert_eq!(labels.len(), x.n_rows());

    for (i, &label) in labels.iter().enumerate() {
        assert!(label < 3, "label[{i}] = {label} out of range");
        let d_assigned = x.row_distance_squared(i, &centroids, label);
        for c in 0..3 {
            let d = x.row_distance_squared(i, &centroids, c);
            assert!(
                d_assigned <= d,
                "point {i}: assigned {label} at {d_assigned}, but {c} is at {d}"
            );
        }
    }
}

/// Assign: repeated calls give identical output
#[test]
fn kmeans_assignment_is_deterministic() {
    let x = blobs();
    let centroids = Matrix::from_vec(2, 2, vec![3.0, 3.0, 9.0, 1.0]).expect("2x2");
    let first = assign_to_nearest(&x, &centroids).expect("ok");
    for _ in 0..10 {
        assert_eq!(assign_to_nearest(&x, &centroids).expect("ok"), first);
    }
}

/// Update then re-assign at a fixed point yields the same labels
#[test]
fn kmeans_fixed_point_is_stable() {
    let x = blobs();
    let kmeans = KMeansClustering::new(KMeansConfig::new(3).with_random_state(7))
        .expect("valid config");
    let labels = kmeans.fit(&x).expect("fit");
    let centroids = kmeans.cluster_centers().expect("fitted");

    // The fitted labels are nearest-centroid labels
    assert_eq!(assign_to_nearest(&x, &centroids).expect("ok"), labels);

    let updated = update_centroids(&x, &labels, 3).expect("no empty cluster");
    assert_eq!(assign_to_nearest(&x, &updated).expect("ok"), labels);
}

/// Worked example: 1..10 against centroids 0, 5.5, 10
#[test]
fn kmeans_assign_worked_example() {
    let x = line(10);
    let centroids = Matrix::from_vec(3, 1, vec![0.0, 5.5, 10.0]).expect("3x1");
    let labels = assign_to_nearest(&x, &centroids).expect("ok");
    assert_eq!(labels, vec![0, 0, 1, 1, 1, 1, 1, 2, 2, 2]);
}

/// Worked example: update with a mixed assignment gives 1.5, 6, 7
#[test]
fn kmeans_update_worked_example() {
    let x = line(10);
    let labels = [0, 0, 1, 2, 1, 2, 1, 2, 1, 2];
    let centroids = update_centroids(&x, &labels, 3).expect("populated");
    assert_eq!(centroids.shape(), (3, 1));
    let expected = [1.5, 6.0, 7.0];
    for (c, &e) in expected.iter().enumerate() {
        assert!(
            (centroids.get(c, 0) - e).abs() < 1e-6,
            "centroid {c} = {}, expected {e}",
            centroids.get(c, 0)
        );
    }
}

/// An unreferenced cluster is reported as NumericDegeneracy, never NaN
#[test]
fn kmeans_update_empty_cluster_is_error() {
    let x = line(10);
    let labels = [0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
    match update_centroids(&x, &labels, 3) {
        Err(AgruparError::NumericDegeneracy { cluster }) => assert_eq!(cluster, 2),
        other => panic!("expected NumericDegeneracy for cluster 2, got {other:?}"),
    }
}

/// k == n: init succeeds and the fit is stable after one round
#[test]
fn kmeans_every_sample_its_own_cluster() {
    let x = line(6);
    let kmeans = KMeansClustering::new(KMeansConfig::new(6).with_random_state(3))
        .expect("valid config");
    let labels = kmeans.fit(&x).expect("k == n is valid");

    let mut sorted = labels.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(kmeans.n_iter(), 1);
    assert!(kmeans.inertia() < 1e-6);
}

/// predict on a fresh instance is a state error, not a panic
#[test]
fn kmeans_predict_unfitted_is_invalid_state() {
    let kmeans = KMeansClustering::default();
    let err = kmeans.predict(&line(3)).expect_err("unfitted");
    assert!(matches!(err, AgruparError::InvalidState { .. }));
    assert!(err.is_state_error());
}

/// Inertia is non-negative and never increases with more clusters on
/// well-separated data
#[test]
fn kmeans_inertia_non_negative() {
    let x = blobs();
    let one = KMeansClustering::new(KMeansConfig::new(1).with_random_state(1)).expect("valid");
    let three = KMeansClustering::new(KMeansConfig::new(3).with_random_state(1)).expect("valid");
    one.fit(&x).expect("fit");
    three.fit(&x).expect("fit");
    assert!(one.inertia() >= 0.0);
    assert!(three.inertia() >= 0.0);
    assert!(three.inertia() <= one.inertia());
}
