use super::*;

#[test]
fn axis_weight_profile() {
    let e = 1.5;
    assert_eq!(axis_weight(0.0, e), 1.0);
    assert!((axis_weight(1.0 / e, e) - 1.0).abs() < 1e-6);
    assert_eq!(axis_weight(0.5, e), 1.0);
    assert!((axis_weight(1.0, e) - 0.5).abs() < 1e-6);
    assert!(axis_weight(e, e).abs() < 1e-6);
    assert_eq!(axis_weight(2.0, e), 0.0);
}

#[test]
fn axis_weight_is_monotonic() {
    let e = 1.3;
    let mut last = 1.0;
    for i in 0..=200 {
        let c = i as f32 / 100.0;
        let w = axis_weight(c, e);
        assert!(w <= last + 1e-7, "increased at {c}");
        last = w;
    }
}

#[test]
fn reciprocal_coordinates_across_a_seam_sum_to_one() {
    let e = 1.5;
    for i in 1..50 {
        let c = 1.0 / e + (e - 1.0 / e) * i as f32 / 50.0;
        let sum = axis_weight(c, e) + axis_weight(1.0 / c, e);
        assert!((sum - 1.0).abs() < 1e-5, "c={c} sum={sum}");
    }
}

#[test]
fn no_overlap_means_hard_edges() {
    assert_eq!(axis_weight(0.999, 1.0), 1.0);
    assert_eq!(axis_weight(1.001, 1.0), 0.0);
}

#[test]
fn face_weight_multiplies_axes() {
    let e = 1.5;
    assert_eq!(face_weight(0.0, 0.0, e), 1.0);
    assert!((face_weight(1.0, -1.0, e) - 0.25).abs() < 1e-6);
    assert_eq!(face_weight(-2.0, 0.0, e), 0.0);
}

#[test]
fn merge_weights_average_and_seam_aware() {
    assert_eq!(merge_weights(DualMerge::Average, 0.1, 0.9), (0.5, 0.5));

    let (a, b) = merge_weights(DualMerge::SeamWeighted, 0.0, 1.0);
    assert_eq!((a, b), (1.0, 0.0));

    let (a, b) = merge_weights(DualMerge::SeamWeighted, 0.4, 0.4);
    assert!((a - 0.5).abs() < 1e-6 && (b - 0.5).abs() < 1e-6);

    // Both on a seam: fall back to the plain average.
    assert_eq!(merge_weights(DualMerge::SeamWeighted, 1.0, 1.0), (0.5, 0.5));
}
