use super::*;

fn dims() -> ImageDims {
    ImageDims::new(100, 100).unwrap()
}

#[test]
fn circle_rejects_out_of_domain_parameters() {
    assert!(Circle::new((0.5, 0.5), 0.0, 0.0).is_err());
    assert!(Circle::new((0.5, 0.5), -0.1, 0.0).is_err());
    assert!(Circle::new((0.5, 0.5), 0.51, 0.0).is_err());
    assert!(Circle::new((0.5, 0.5), 0.1, -0.01).is_err());
    assert!(Circle::new((f32::NAN, 0.5), 0.1, 0.0).is_err());
    assert!(Circle::new((0.5, 0.5), 0.5, 0.3).is_ok());

    let err = Circle::new((0.5, 0.5), 0.0, 0.0).unwrap_err();
    assert!(matches!(err, BlendError::InvalidShape(_)));
}

#[test]
fn source_must_be_finite() {
    let c = Circle::new((0.5, 0.5), 0.1, 0.0).unwrap();
    assert!(c.with_source((0.2, 0.3)).is_ok());
    assert!(c.with_source((f32::INFINITY, 0.3)).is_err());
}

#[test]
fn pixel_geometry_uses_shorter_side() {
    let c = Circle::new((0.25, 0.5), 0.1, 0.05).unwrap();
    let image = ImageDims::new(400, 200).unwrap();
    assert_eq!(c.center_px(image), Point::new(100.0, 100.0));
    assert!((c.radius_px(image) - 20.0).abs() < 1e-4);
    assert!((c.total_px(image) - 30.0).abs() < 1e-4);
}

#[test]
fn falloff_is_quadratic_across_the_band() {
    let c = Circle::new((0.5, 0.5), 0.1, 0.02).unwrap();
    let f = CircleFalloff::new(&c, dims());
    assert_eq!(f.opacity(Point::new(50.0, 50.0)), 1.0);
    assert_eq!(f.opacity(Point::new(59.9, 50.0)), 1.0);

    let expected = ((144.0f64 - 121.0) / (144.0 - 100.0)).powi(2) as f32;
    assert!((f.opacity(Point::new(61.0, 50.0)) - expected).abs() < 1e-3);
    assert_eq!(f.opacity(Point::new(63.0, 50.0)), 0.0);
}

#[test]
fn zero_border_is_a_step() {
    let c = Circle::new((0.5, 0.5), 0.1, 0.0).unwrap();
    let f = CircleFalloff::new(&c, dims());
    for k in 0..200 {
        let x = 50.0 + k as f64 * 0.1;
        let v = f.opacity(Point::new(x, 50.0));
        assert!(v == 0.0 || v == 1.0, "x={x} v={v}");
    }
}

#[test]
fn outline_segments_are_shorter_than_a_pixel() {
    for r in [0.5, 3.0, 12.0, 97.3] {
        let pts = sample_outline(Point::new(10.0, 10.0), r).unwrap();
        assert!(pts.len() >= 8);
        for (a, b) in pts.iter().zip(pts.iter().cycle().skip(1)) {
            assert!((*a - *b).hypot() < 1.0, "r={r}");
            assert!(((*a - Point::new(10.0, 10.0)).hypot() - r).abs() < 1e-9);
        }
    }
}

#[test]
fn serde_skips_missing_source() {
    let c = Circle::new((0.5, 0.25), 0.1, 0.02).unwrap();
    let json = serde_json::to_string(&c).unwrap();
    assert!(!json.contains("source"));
    let back: Circle = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}
