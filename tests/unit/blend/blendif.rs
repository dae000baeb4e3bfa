use super::*;
use crate::blend::params::MaskMode;

fn params_with(blendif: u32, channel: usize, range: [f32; 4]) -> BlendParams {
    let mut p = BlendParams {
        mask_mode: MaskMode::ENABLED | MaskMode::CONDITIONAL,
        blendif,
        ..BlendParams::default()
    };
    p.blendif_parameters[4 * channel..4 * channel + 4].copy_from_slice(&range);
    p
}

#[test]
fn factor_is_a_trapezoid() {
    let r = ChannelRange::new([0.2, 0.4, 0.6, 0.8]);
    assert_eq!(r.factor(0.1), 0.0);
    assert_eq!(r.factor(0.9), 0.0);
    assert!((r.factor(0.3) - 0.5).abs() < 1e-6);
    assert_eq!(r.factor(0.4), 1.0);
    assert_eq!(r.factor(0.6), 1.0);
    assert!((r.factor(0.7) - 0.5).abs() < 1e-6);
    assert_eq!(r.factor(0.8), 0.0);
}

#[test]
fn factor_is_monotonic_on_ramps() {
    let r = ChannelRange::new([0.1, 0.35, 0.5, 0.95]);
    let mut prev = 0.0;
    for k in 0..=35 {
        let f = r.factor(0.1 + k as f32 * 0.01);
        assert!(f >= prev - 1e-6);
        prev = f;
    }
    for k in 0..=45 {
        let f = r.factor(0.5 + k as f32 * 0.01);
        assert!(f <= prev + 1e-6);
        prev = f;
    }
}

#[test]
fn degenerate_default_range_includes_everything() {
    let r = ChannelRange::new([0.0, 0.0, 1.0, 1.0]);
    for v in [0.0, 0.25, 1.0] {
        assert_eq!(r.factor(v), 1.0);
    }
}

#[test]
fn no_active_channel_is_noop() {
    let gate = BlendIfGate::new(&BlendParams::default(), ColorSpace::Rgb);
    assert!(gate.is_noop());
    assert_eq!(gate.evaluate(&[0.3; 4], &[0.9; 4]), 1.0);
    let buf = gate
        .gate_buffer(2, 1, &[0.0; 8], &[1.0; 8], true)
        .unwrap();
    assert_eq!(buf.as_slice(), &[1.0, 1.0]);
}

#[test]
fn polarity_inverts_contribution() {
    let range = [0.0, 0.0, 0.5, 0.5];
    let plain = BlendIfGate::new(&params_with(1 << 1, 1, range), ColorSpace::Rgb);
    let inverted = BlendIfGate::new(&params_with((1 << 1) | (1 << 17), 1, range), ColorSpace::Rgb);
    let dark = [0.2, 0.0, 0.0, 1.0];
    let bright = [0.8, 0.0, 0.0, 1.0];
    assert_eq!(plain.evaluate(&dark, &dark), 1.0);
    assert_eq!(plain.evaluate(&bright, &bright), 0.0);
    assert_eq!(inverted.evaluate(&dark, &dark), 0.0);
    assert_eq!(inverted.evaluate(&bright, &bright), 1.0);
}

#[test]
fn input_and_output_gates_multiply() {
    let mut p = params_with((1 << 1) | (1 << 5), 1, [0.0, 0.0, 0.5, 1.0]);
    p.blendif_parameters[20..24].copy_from_slice(&[0.0, 0.0, 0.25, 0.75]);
    let gate = BlendIfGate::new(&p, ColorSpace::Rgb);
    // Input R = 0.75 gives 0.5, output R = 0.5 gives 0.5.
    let g = gate.evaluate(&[0.75, 0.0, 0.0, 1.0], &[0.5, 0.0, 0.0, 1.0]);
    assert!((g - 0.25).abs() < 1e-6);
}

#[test]
fn group_uses_min_unless_masks_pos() {
    let mut p = params_with((1 << 1) | (1 << 2), 1, [0.0, 0.0, 0.5, 0.5]);
    p.blendif_parameters[8..12].copy_from_slice(&[0.0, 0.0, 1.0, 1.0]);
    let px = [0.9, 0.9, 0.0, 1.0];
    assert_eq!(BlendIfGate::new(&p, ColorSpace::Rgb).evaluate(&px, &px), 0.0);

    p.mask_combine = MaskCombine::MASKS_POS;
    assert_eq!(BlendIfGate::new(&p, ColorSpace::Rgb).evaluate(&px, &px), 1.0);
}

#[test]
fn channels_outside_colorspace_are_ignored() {
    // Channel 3 (blue) exists only in RGB.
    let p = params_with(1 << 3, 3, [0.0, 0.0, 0.1, 0.1]);
    assert!(BlendIfGate::new(&p, ColorSpace::Lab).is_noop());
    assert!(!BlendIfGate::new(&p, ColorSpace::Rgb).is_noop());
}

#[test]
fn lab_lightness_channel_uses_l_over_100() {
    let p = params_with(1, 0, [0.0, 0.0, 0.5, 0.7]);
    let gate = BlendIfGate::new(&p, ColorSpace::Lab);
    assert_eq!(gate.evaluate(&[40.0, 0.0, 0.0, 1.0], &[0.0; 4]), 1.0);
    assert!((gate.evaluate(&[60.0, 0.0, 0.0, 1.0], &[0.0; 4]) - 0.5).abs() < 1e-5);
}

#[test]
fn gate_buffer_parallel_matches_serial_and_checks_lengths() {
    let p = params_with(1 << 1, 1, [0.1, 0.3, 0.6, 0.9]);
    let gate = BlendIfGate::new(&p, ColorSpace::Rgb);
    let (w, h) = (40u32, 30u32);
    let input: Vec<f32> = (0..w * h * 4).map(|i| (i % 97) as f32 / 96.0).collect();
    let a = gate.gate_buffer(w, h, &input, &input, false).unwrap();
    let b = gate.gate_buffer(w, h, &input, &input, true).unwrap();
    assert_eq!(a, b);
    assert!(gate.gate_buffer(w, h, &input[4..], &input, false).is_err());
}
