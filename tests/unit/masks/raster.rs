use super::*;
use crate::transform::{AffineOp, DistortKind, DistortionChain, Identity};

fn disc(center: Point, r: f64) -> impl Fn(Point) -> f32 + Sync {
    move |p| if (p - center).hypot() < r { 1.0 } else { 0.0 }
}

#[test]
fn mesh_dims_include_trailing_edge() {
    assert_eq!(mesh_dims(100, 100, 4), (26, 26));
    assert_eq!(mesh_dims(101, 3, 4), (27, 2));
    assert_eq!(mesh_dims(5, 5, 1), (6, 6));
}

#[test]
fn stride_one_evaluates_every_pixel() {
    let roi = Roi::new(0, 0, 7, 5, 1.0).unwrap();
    let buf = rasterize_mesh(&roi, 1, &Identity, PriorityRange::ALL, false, |p: Point| {
        ((p.x + 10.0 * p.y) / 100.0) as f32
    })
    .unwrap();
    for y in 0..5u32 {
        for x in 0..7u32 {
            let expected = (f64::from(x) + 10.0 * f64::from(y)) / 100.0;
            assert!((buf.get(x, y).unwrap() - expected as f32).abs() < 1e-6);
        }
    }
}

#[test]
fn bilinear_reconstructs_linear_fields_exactly() {
    let roi = Roi::new(3, -2, 13, 9, 1.0).unwrap();
    let field = |p: Point| ((p.x * 0.01) + (p.y * 0.02) + 0.1) as f32;
    let buf = rasterize_mesh(&roi, 4, &Identity, PriorityRange::ALL, true, field).unwrap();
    for y in 0..9u32 {
        for x in 0..13u32 {
            let p = Point::new(f64::from(x) + 3.0, f64::from(y) - 2.0);
            assert!((buf.get(x, y).unwrap() - field(p)).abs() < 1e-5);
        }
    }
}

#[test]
fn roi_scale_divides_mesh_positions() {
    let roi = Roi::new(10, 20, 4, 4, 2.0).unwrap();
    let buf = rasterize_mesh(&roi, 1, &Identity, PriorityRange::ALL, false, |p: Point| {
        (p.x / 100.0) as f32
    })
    .unwrap();
    assert!((buf.get(0, 0).unwrap() - 0.05).abs() < 1e-6);
    assert!((buf.get(3, 0).unwrap() - 0.065).abs() < 1e-6);
    let buf = rasterize_mesh(&roi, 1, &Identity, PriorityRange::ALL, false, |p: Point| {
        (p.y / 100.0) as f32
    })
    .unwrap();
    assert!((buf.get(0, 2).unwrap() - 0.11).abs() < 1e-6);
}

#[test]
fn empty_roi_gives_empty_buffer() {
    let roi = Roi::new(0, 0, 0, 12, 1.0).unwrap();
    let buf = rasterize_mesh(&roi, 4, &Identity, PriorityRange::ALL, true, |_| 1.0).unwrap();
    assert_eq!(buf.width(), 0);
    assert!(buf.as_slice().is_empty());
}

#[test]
fn zero_stride_is_rejected() {
    let roi = Roi::new(0, 0, 4, 4, 1.0).unwrap();
    assert!(rasterize_mesh(&roi, 0, &Identity, PriorityRange::ALL, true, |_| 1.0).is_err());
}

#[test]
fn mesh_is_sampled_through_backward_transform() {
    let chain = DistortionChain::new().with(0, DistortKind::Affine(AffineOp::translate(20.0, 0.0)));
    let roi = Roi::new(0, 0, 60, 20, 1.0).unwrap();
    let buf = rasterize_mesh(
        &roi,
        1,
        &chain,
        PriorityRange::ALL,
        false,
        disc(Point::new(10.0, 10.0), 5.0),
    )
    .unwrap();
    assert_eq!(buf.get(30, 10), Some(1.0));
    assert_eq!(buf.get(10, 10), Some(0.0));
}

#[test]
fn dense_matches_stride_one_mesh() {
    let area = PixelArea {
        x: -3,
        y: 4,
        width: 17,
        height: 11,
    };
    let roi = Roi::new(-3, 4, 17, 11, 1.0).unwrap();
    let f = disc(Point::new(5.0, 9.0), 4.5);
    let dense = rasterize_dense(area, &Identity, PriorityRange::ALL, true, &f).unwrap();
    let mesh = rasterize_mesh(&roi, 1, &Identity, PriorityRange::ALL, false, &f).unwrap();
    assert_eq!(dense, mesh);
}

#[test]
fn outline_bounds_spans_points() {
    let pts = [
        Point::new(1.0, 5.0),
        Point::new(-2.0, 3.0),
        Point::new(4.0, -1.0),
    ];
    assert_eq!(outline_bounds(&pts), Some(Rect::new(-2.0, -1.0, 4.0, 5.0)));
    assert_eq!(outline_bounds(&[]), None);
    assert_eq!(outline_bounds(&[Point::new(f64::NAN, 0.0)]), None);
}
