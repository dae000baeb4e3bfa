use super::*;
use crate::foundation::core::Point;

fn assert_close(a: Point, b: Point) {
    assert!(
        (a - b).hypot() < 1e-6,
        "expected {b:?}, got {a:?} (distance {})",
        (a - b).hypot()
    );
}

fn sample_chain() -> DistortionChain {
    DistortionChain::new()
        .with(
            30,
            DistortKind::Lens(LensOp::new(Point::new(50.0, 50.0), 50.0, 0.08, 0.01).unwrap()),
        )
        .with(10, DistortKind::Affine(AffineOp::translate(-12.0, 4.0)))
        .with(
            20,
            DistortKind::Affine(AffineOp::rotate_about(0.3, Point::new(40.0, 40.0))),
        )
}

#[test]
fn priority_range_is_half_open() {
    let r = PriorityRange::new(10, 20);
    assert!(!r.contains(9));
    assert!(r.contains(10));
    assert!(r.contains(19));
    assert!(!r.contains(20));
    assert!(PriorityRange::before(20).contains(-500));
    assert!(!PriorityRange::before(20).contains(20));
    assert!(PriorityRange::ALL.contains(0));
}

#[test]
fn chain_keeps_operators_sorted() {
    let chain = sample_chain();
    let prios: Vec<i32> = chain.ops().iter().map(|op| op.priority).collect();
    assert_eq!(prios, vec![10, 20, 30]);
    assert_eq!(chain.len(), 3);
}

#[test]
fn chain_backward_inverts_forward() {
    let chain = sample_chain();
    let original = vec![
        Point::new(0.0, 0.0),
        Point::new(12.5, 77.0),
        Point::new(50.0, 50.0),
        Point::new(99.0, 3.0),
    ];
    let mut pts = original.clone();
    chain.forward(&mut pts, PriorityRange::ALL).unwrap();
    assert!((pts[1] - original[1]).hypot() > 1.0);
    chain.backward(&mut pts, PriorityRange::ALL).unwrap();
    for (a, b) in pts.iter().zip(&original) {
        assert_close(*a, *b);
    }
}

#[test]
fn range_restricts_applied_operators() {
    let chain = sample_chain();
    let mut pts = vec![Point::new(5.0, 5.0)];
    chain.forward(&mut pts, PriorityRange::before(20)).unwrap();
    assert_close(pts[0], Point::new(-7.0, 9.0));
}

#[test]
fn lens_inverse_fails_where_polynomial_folds() {
    let lens = LensOp::new(Point::ZERO, 1.0, -0.5, 0.0).unwrap();
    let chain = DistortionChain::new().with(0, DistortKind::Lens(lens));
    let mut pts = vec![Point::new(3.0, 0.0)];
    let err = chain.backward(&mut pts, PriorityRange::ALL).unwrap_err();
    assert!(matches!(err, crate::BlendError::Transform(_)));
}

#[test]
fn singular_affine_is_rejected() {
    assert!(AffineOp::new(crate::foundation::core::Affine::scale(0.0)).is_err());
    assert!(AffineOp::scale(2.0).is_ok());
}

#[test]
fn map_points_parallel_matches_serial() {
    let chain = sample_chain();
    let mut serial: Vec<Point> = (0..(TRANSFORM_CHUNK * 2 + 17))
        .map(|i| Point::new((i % 97) as f64, (i / 97) as f64))
        .collect();
    let mut parallel = serial.clone();
    map_points(
        &chain,
        &mut serial,
        PriorityRange::ALL,
        Direction::Backward,
        false,
    )
    .unwrap();
    map_points(
        &chain,
        &mut parallel,
        PriorityRange::ALL,
        Direction::Backward,
        true,
    )
    .unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn identity_leaves_points() {
    let mut pts = vec![Point::new(1.5, -2.0)];
    Identity.forward(&mut pts, PriorityRange::ALL).unwrap();
    Identity.backward(&mut pts, PriorityRange::ALL).unwrap();
    assert_eq!(pts[0], Point::new(1.5, -2.0));
}
