use super::*;
use crate::error::QuadError;
use nalgebra::{vector, Matrix3};

#[test]
fn basis_roundtrips_local_and_world() {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let b = Basis::new(vector![1.0, 0.0], vector![s, s], vector![10.0, 5.0]);
    let p = vector![3.0, -2.0];
    let local = b.to_local(p).unwrap();
    assert!((b.to_world(local) - p).norm() < 1e-12);
    // x axis is (1,0): moving one unit along local x moves one unit in world x.
    let shifted = b.to_world(local + vector![1.0, 0.0]);
    assert!((shifted - p - vector![1.0, 0.0]).norm() < 1e-12);
    assert_eq!(b.origin(), vector![10.0, 5.0]);
}

#[test]
fn parallel_axes_are_singular() {
    let b = Basis::new(vector![1.0, 0.0], vector![-1.0, 0.0], vector![0.0, 0.0]);
    assert!(b.inverse().is_none());
    assert!(b.inverse_or_nan().iter().all(|v| v.is_nan()));
}

#[test]
fn affine_factors_keep_homogeneous_row() {
    let t = translation_matrix(vector![4.0, -1.0]);
    let s = uniform_scale_matrix(3.0);
    assert_eq!(translation_of(&t), vector![4.0, -1.0]);
    assert_eq!(s[(0, 0)], 3.0);
    assert_eq!(s[(1, 1)], 3.0);
    assert_eq!(s[(2, 2)], 1.0);
    let p = apply(&(t * s), vector![1.0, 1.0]);
    assert!((p - vector![7.0, 2.0]).norm() < 1e-12);
}

#[test]
fn rotation_about_pivot_fixes_pivot() {
    let pivot = vector![50.0, 25.0];
    let r = Rotation::about(pivot, 0.7);
    assert!((r.apply(pivot) - pivot).norm() < 1e-12);
    let q = r.apply(vector![60.0, 25.0]);
    assert!(((q - pivot).norm() - 10.0).abs() < 1e-12);
    let back = r.inverse().apply(q);
    assert!((back - vector![60.0, 25.0]).norm() < 1e-12);
    // Quarter turn about the origin is counter-clockwise.
    let quarter = Rotation::about_origin(std::f64::consts::FRAC_PI_2);
    assert!((quarter.apply(vector![1.0, 0.0]) - vector![0.0, 1.0]).norm() < 1e-12);
    assert_eq!(Rotation::identity().matrix(), Matrix3::identity());
}

#[test]
fn closed_quad_enforces_closure() {
    let pts = [
        vector![0.0, 0.0],
        vector![0.0, 50.0],
        vector![100.0, 50.0],
        vector![100.0, 0.0],
        vector![0.0, 0.0],
    ];
    let q = ClosedQuad::try_from_closed(&pts).unwrap();
    assert_eq!(q.vertex(4), q.vertex(0));
    assert_eq!(q.distinct().len(), 4);
    assert_eq!(
        ClosedQuad::try_from_closed(&pts[..4]),
        Err(QuadError::WrongVertexCount(4))
    );
    let mut open = pts;
    open[4] = vector![1.0, 1.0];
    assert_eq!(ClosedQuad::try_from(&open[..]), Err(QuadError::NotClosed));
    assert!((q.centroid() - vector![50.0, 25.0]).norm() < 1e-12);
}

#[test]
fn convexity_check() {
    let square = ClosedQuad::from_taps([
        vector![0.0, 0.0],
        vector![0.0, 1.0],
        vector![1.0, 1.0],
        vector![1.0, 0.0],
    ]);
    assert!(square.is_strictly_convex());
    let dart = ClosedQuad::from_taps([
        vector![0.0, 0.0],
        vector![0.2, 0.2],
        vector![1.0, 1.0],
        vector![1.0, 0.0],
    ]);
    assert!(!dart.is_strictly_convex());
    let bowtie = ClosedQuad::from_taps([
        vector![0.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
        vector![1.0, 0.0],
    ]);
    assert!(!bowtie.is_strictly_convex());
    // Either winding is accepted; tap order decides the sign of every turn.
    let ccw = ClosedQuad::from_taps([
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
    ]);
    assert!(ccw.is_strictly_convex());
    let c = ccw.distinct();
    assert!(crate::parallelogram_area(c[1] - c[0], c[2] - c[1]) > 0.0);
    let c = square.distinct();
    assert!(crate::parallelogram_area(c[1] - c[0], c[2] - c[1]) < 0.0);
}

#[test]
fn reference_rect_centered_layout() {
    let r = ReferenceRect::centered(vector![200.0, 400.0], 100.0, 50.0);
    let p = r.points();
    assert_eq!(p[0], vector![150.0, 375.0]);
    assert_eq!(p[1], vector![250.0, 375.0]);
    assert_eq!(p[2], vector![250.0, 425.0]);
    assert_eq!(p[3], vector![150.0, 425.0]);
    assert_eq!(p[4], p[0]);
    assert_eq!(r.width(), 100.0);
    assert_eq!(r.height(), 50.0);
}

#[test]
fn tap_sequence_closes_on_fourth_and_restarts_on_fifth() {
    let mut taps = TapSequence::new();
    assert_eq!(taps.push(vector![0.0, 0.0]), TapOutcome::Pending(1));
    assert_eq!(taps.push(vector![0.0, 50.0]), TapOutcome::Pending(2));
    assert_eq!(taps.push(vector![100.0, 50.0]), TapOutcome::Pending(3));
    let quad = match taps.push(vector![100.0, 0.0]) {
        TapOutcome::Closed(q) => q,
        other => panic!("expected closed quad, got {other:?}"),
    };
    assert_eq!(quad.vertex(4), vector![0.0, 0.0]);
    assert!(taps.pending().is_empty());
    assert_eq!(taps.closed(), Some(&quad));

    assert_eq!(taps.push(vector![7.0, 7.0]), TapOutcome::Restarted);
    assert!(taps.closed().is_none());
    assert_eq!(taps.pending(), &[vector![7.0, 7.0]]);
}

#[test]
fn hull_region_contains_interior_only() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
        vector![0.5, 0.5],
    ];
    let hull = convex_hull(&pts).unwrap();
    assert_eq!(hull.len(), 4);
    let region = ConvexRegion::from_points(&pts).unwrap();
    assert_eq!(region.hs.len(), 4);
    assert!(region.contains_eps(vector![0.5, 0.5], 0.0));
    assert!(region.contains_eps(vector![1.0, 0.5], 1e-12));
    assert!(!region.contains_eps(vector![1.1, 0.5], 1e-9));
    // Collinear input has no area.
    assert!(ConvexRegion::from_points(&[vector![0.0, 0.0], vector![1.0, 1.0], vector![2.0, 2.0]]).is_none());
}
