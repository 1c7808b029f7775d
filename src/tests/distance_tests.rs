use crate::analysis::distance::{dtw, DistanceMatrix};

#[test]
fn identical_series_align_at_zero() {
    let series: Vec<u64> = (100..200).collect();
    assert_eq!(dtw(&series, &series), 0.0);
}

#[test]
fn known_alignment_costs() {
    assert_eq!(dtw(&[1], &[2]), 1.0);
    assert_eq!(dtw(&[0, 0], &[1, 1]), 2.0);
    assert_eq!(dtw(&[1, 2, 3], &[2, 3, 4]), 2.0);
    // Warping absorbs repetition at no cost.
    assert_eq!(dtw(&[1, 1], &[1]), 0.0);
}

#[test]
fn empty_series_edge_cases() {
    assert_eq!(dtw(&[], &[]), 0.0);
    assert!(dtw(&[], &[1, 2]).is_infinite());
}

#[test]
fn matrix_is_symmetric_nonnegative_with_zero_diagonal() {
    let a: Vec<u64> = (100..150).collect();
    let b: Vec<u64> = (103..153).collect();
    let c: Vec<u64> = (100..150).map(|s| s * 7 % 1000).collect();
    let d: Vec<u64> = (120..140).collect();
    let series: Vec<&[u64]> = vec![&a, &b, &c, &d];

    let matrix = DistanceMatrix::build(&series);
    assert_eq!(matrix.len(), 4);
    for i in 0..matrix.len() {
        assert_eq!(matrix.get(i, i), 0.0);
        for j in 0..matrix.len() {
            assert!(matrix.get(i, j) >= 0.0);
            assert_eq!(matrix.get(i, j), matrix.get(j, i));
        }
    }
}

#[test]
fn distances_are_normalized_by_longer_length() {
    let a: Vec<u64> = vec![0, 0];
    let b: Vec<u64> = vec![1, 1];
    let matrix = DistanceMatrix::build(&[&a, &b]);
    // Alignment cost 2 over max length 2.
    assert_eq!(matrix.get(0, 1), 1.0);
}

#[test]
fn empty_input_builds_empty_matrix() {
    let matrix = DistanceMatrix::build(&[]);
    assert!(matrix.is_empty());
}
