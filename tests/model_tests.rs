mod common;

use common::{line_distances, small_problem, SMALL_B, SMALL_D, SMALL_OPTIMUM};
use medoid_pt::{Problem, SolverError};
use rstest::rstest;

#[test]
fn test_evaluate_small_problem() {
    let p = small_problem(None);
    assert!((p.evaluate(&[0, 1]) - SMALL_OPTIMUM).abs() < 1e-12);
    assert!((p.evaluate(&[2, 3]) - 6.7).abs() < 1e-12);
    assert!((p.evaluate(&[3, 1]) - 5.6).abs() < 1e-12);
}

#[rstest]
#[case(4, 0)]
#[case(4, 4)]
#[case(4, 5)]
fn test_cardinality_out_of_range(#[case] n: usize, #[case] k: usize) {
    let res = Problem::new(n, k, SMALL_D.to_vec(), SMALL_B.to_vec(), None);
    assert!(matches!(res, Err(SolverError::Validation(_))));
}

#[test]
fn test_rejects_wrong_sizes() {
    assert!(Problem::new(4, 2, SMALL_D[..12].to_vec(), SMALL_B.to_vec(), None).is_err());
    assert!(Problem::new(4, 2, SMALL_D.to_vec(), vec![0.0; 3], None).is_err());
}

#[test]
fn test_rejects_asymmetric_matrix() {
    let mut d = SMALL_D.to_vec();
    d[1] = 1.5;
    let err = Problem::new(4, 2, d, SMALL_B.to_vec(), None).unwrap_err();
    assert!(err.to_string().contains("symmetric"), "{}", err);
}

#[test]
fn test_rejects_nonzero_diagonal() {
    let mut d = SMALL_D.to_vec();
    d[5] = 0.5;
    assert!(Problem::new(4, 2, d, SMALL_B.to_vec(), None).is_err());
}

#[test]
fn test_rejects_non_finite_entries() {
    let mut d = SMALL_D.to_vec();
    d[1] = f64::NAN;
    d[4] = f64::NAN;
    assert!(Problem::new(4, 2, d, SMALL_B.to_vec(), None).is_err());

    let mut b = SMALL_B.to_vec();
    b[2] = f64::INFINITY;
    assert!(Problem::new(4, 2, SMALL_D.to_vec(), b, None).is_err());
}

#[test]
fn test_k_medoids_construction() {
    let dist = line_distances(&[0.0, 1.0, 3.0]);
    let p = Problem::k_medoids(dist, 3, 1, 2.0, 0.5, None).unwrap();

    // row sums: 4, 3, 5
    assert_eq!(p.bias(), &[2.0, 1.5, 2.5]);
    assert_eq!(p.d(0, 2), -6.0);
    assert_eq!(p.d(1, 1), 0.0);
    assert_eq!(p.raw_distances().unwrap()[2], 3.0);
}

#[test]
fn test_generate_assignments_uses_nearest_medoid() {
    let xs = [0.0, 0.5, 1.0, 10.0, 10.5, 11.0];
    let p = Problem::k_medoids(line_distances(&xs), 6, 2, 1.0, 1.0, None).unwrap();

    assert_eq!(p.generate_assignments(&[4, 1]), vec![1, 1, 1, 0, 0, 0]);
}

#[test]
fn test_assignments_without_raw_distances() {
    // D holds negated distances, so the nearest medoid has the largest D
    let p = small_problem(None);
    assert_eq!(p.generate_assignments(&[2, 3]), vec![1, 1, 1, 0]);
}

#[test]
fn test_target_cost_accessors() {
    let mut p = small_problem(Some(2.0));
    assert_eq!(p.target_cost(), Some(2.0));
    p.set_target_cost(None);
    assert_eq!(p.target_cost(), None);
    assert_eq!(p.num_vars(), 4);
    assert_eq!(p.num_k(), 2);
    assert_eq!(p.d_row(2), &SMALL_D[8..12]);
}
