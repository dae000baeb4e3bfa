use super::*;
use crate::blend::BlendMode;
use crate::foundation::core::{ImageDims, RasterSettings};
use crate::masks::Circle;
use crate::transform::Identity;

fn solid(n: usize, v: [f32; 4]) -> Vec<f32> {
    v.repeat(n)
}

fn enabled(mode: MaskMode) -> BlendParams {
    BlendParams {
        mask_mode: mode,
        ..BlendParams::default()
    }
}

#[test]
fn disabled_copies_output() {
    let roi = Roi::new(0, 0, 3, 2, 1.0).unwrap();
    let input = solid(6, [0.1, 0.2, 0.3, 1.0]);
    let output = solid(6, [0.9, 0.8, 0.7, 0.5]);
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output);
    let ctx = MaskContext::new(ImageDims::new(3, 2).unwrap(), &Identity);
    let out = blend_process(&BlendParams::default(), &req, &ctx).unwrap();
    assert_eq!(out, output);
    let mask = build_mask(&BlendParams::default(), &req, &ctx).unwrap();
    assert!(mask.as_slice().iter().all(|v| *v == 1.0));
}

#[test]
fn enabled_only_uses_uniform_opacity() {
    let roi = Roi::new(0, 0, 2, 2, 1.0).unwrap();
    let input = solid(4, [0.0, 0.0, 0.0, 1.0]);
    let output = solid(4, [1.0, 1.0, 1.0, 1.0]);
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output);
    let ctx = MaskContext::new(ImageDims::new(2, 2).unwrap(), &Identity);
    let params = BlendParams {
        opacity: 30.0,
        ..enabled(MaskMode::ENABLED)
    };
    let out = blend_process(&params, &req, &ctx).unwrap();
    for px in out.chunks_exact(4) {
        assert!((px[0] - 0.3).abs() < 1e-6);
        assert_eq!(px[3], 1.0);
    }
}

#[test]
fn drawn_mask_without_shape_is_neutral() {
    let roi = Roi::new(0, 0, 2, 1, 1.0).unwrap();
    let input = solid(2, [0.0; 4]);
    let output = solid(2, [1.0; 4]);
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output);
    let ctx = MaskContext::new(ImageDims::new(2, 1).unwrap(), &Identity);

    let excl = build_mask(&enabled(MaskMode::ENABLED | MaskMode::MASK), &req, &ctx).unwrap();
    assert_eq!(excl.as_slice(), &[1.0, 1.0]);

    let incl = BlendParams {
        mask_combine: MaskCombine::INCL,
        ..enabled(MaskMode::ENABLED | MaskMode::MASK)
    };
    assert_eq!(build_mask(&incl, &req, &ctx).unwrap().as_slice(), &[0.0, 0.0]);

    let inv = BlendParams {
        mask_combine: MaskCombine::INV,
        ..enabled(MaskMode::ENABLED | MaskMode::MASK)
    };
    assert_eq!(build_mask(&inv, &req, &ctx).unwrap().as_slice(), &[0.0, 0.0]);
}

#[test]
fn shape_and_gate_combine_exclusively_or_inclusively() {
    let (w, h) = (20u32, 1u32);
    let roi = Roi::new(0, 0, w, h, 1.0).unwrap();
    // Left half dark, right half bright.
    let input: Vec<f32> = (0..w)
        .flat_map(|x| if x < 10 { [0.1, 0.1, 0.1, 1.0] } else { [0.9, 0.9, 0.9, 1.0] })
        .collect();
    let output = input.clone();
    let shape = Shape::Circle(Circle::new((0.25, 0.0), 0.3, 0.0).unwrap());
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output).with_shape(&shape);
    let settings = RasterSettings {
        mesh_stride: 1,
        ..RasterSettings::default()
    };
    let ctx = MaskContext::new(ImageDims::new(w, 10).unwrap(), &Identity).with_settings(settings);

    // Gate keeps gray <= 0.5 (input channel 0).
    let mut params = enabled(MaskMode::ENABLED | MaskMode::MASK | MaskMode::CONDITIONAL);
    params.blendif = 1;
    params.blendif_parameters[..4].copy_from_slice(&[0.0, 0.0, 0.5, 0.5]);

    // Circle: center x = 5, radius = 3 pixels.
    let excl = build_mask(&params, &req, &ctx).unwrap();
    assert_eq!(excl.get(5, 0), Some(1.0));
    assert_eq!(excl.get(9, 0), Some(0.0));
    assert_eq!(excl.get(15, 0), Some(0.0));

    params.mask_combine = MaskCombine::INCL;
    let incl = build_mask(&params, &req, &ctx).unwrap();
    assert_eq!(incl.get(5, 0), Some(1.0));
    assert_eq!(incl.get(9, 0), Some(1.0));
    assert_eq!(incl.get(15, 0), Some(0.0));
}

#[test]
fn radius_feathers_the_mask() {
    let (w, h) = (16u32, 16u32);
    let roi = Roi::new(0, 0, w, h, 1.0).unwrap();
    let input = solid(256, [0.0, 0.0, 0.0, 1.0]);
    let output = solid(256, [1.0; 4]);
    let shape = Shape::Circle(Circle::new((0.5, 0.5), 0.25, 0.0).unwrap());
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output).with_shape(&shape);
    let ctx = MaskContext::new(ImageDims::new(w, h).unwrap(), &Identity);

    let sharp = enabled(MaskMode::ENABLED | MaskMode::MASK);
    let soft = BlendParams {
        radius: 2.0,
        ..sharp.clone()
    };
    let a = build_mask(&sharp, &req, &ctx).unwrap();
    let b = build_mask(&soft, &req, &ctx).unwrap();
    assert_ne!(a, b);
    assert!(b.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn buffer_size_mismatch_is_rejected() {
    let roi = Roi::new(0, 0, 2, 2, 1.0).unwrap();
    let input = solid(3, [0.0; 4]);
    let output = solid(4, [0.0; 4]);
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output);
    let ctx = MaskContext::new(ImageDims::new(2, 2).unwrap(), &Identity);
    let err = blend_process(&enabled(MaskMode::ENABLED), &req, &ctx).unwrap_err();
    assert!(matches!(err, BlendError::Validation(_)));
}

#[test]
fn multiply_at_full_opacity() {
    let roi = Roi::new(0, 0, 1, 1, 1.0).unwrap();
    let input = vec![0.8, 0.8, 0.8, 1.0];
    let output = vec![0.5, 0.5, 0.5, 1.0];
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output);
    let ctx = MaskContext::new(ImageDims::new(1, 1).unwrap(), &Identity);
    let params = BlendParams {
        blend_mode: BlendMode::Multiply,
        ..enabled(MaskMode::ENABLED)
    };
    let out = blend_process(&params, &req, &ctx).unwrap();
    assert!((out[0] - 0.4).abs() < 1e-6);
}

#[test]
fn enormous_radius_still_blends() {
    let roi = Roi::new(0, 0, 3, 3, 1.0).unwrap();
    let input = solid(9, [0.0, 0.0, 0.0, 1.0]);
    let output = solid(9, [1.0; 4]);
    let req = BlendRequest::new(ColorSpace::Rgb, roi, &input, &output);
    let ctx = MaskContext::new(ImageDims::new(3, 3).unwrap(), &Identity);
    let params = BlendParams {
        radius: 1e30,
        ..enabled(MaskMode::ENABLED | MaskMode::CONDITIONAL)
    };
    let out = blend_process(&params, &req, &ctx).unwrap();
    assert!(out.chunks_exact(4).all(|px| (px[0] - 1.0).abs() < 1e-5));
}
