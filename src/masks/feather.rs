use crate::foundation::core::OpacityBuffer;
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::{clamp01, try_filled};
use crate::foundation::pool::for_each_row;

/// Gaussian-blur `mask` with standard deviation `sigma` pixels, clamping at the edges.
///
/// `sigma <= 0` leaves the mask untouched. The result stays in `[0, 1]`.
pub fn feather(mask: &OpacityBuffer, sigma: f32, parallel: bool) -> BlendResult<OpacityBuffer> {
    if !sigma.is_finite() {
        return Err(BlendError::validation("feather sigma must be finite"));
    }
    if sigma <= 0.0 || mask.as_slice().is_empty() {
        return Ok(mask.clone());
    }

    let (w, h) = (mask.width() as usize, mask.height() as usize);
    let kernel = gaussian_kernel(sigma, w.max(h))?;
    let len = mask.as_slice().len();
    let mut tmp = try_filled(len, 0.0, "feather scratch")?;
    let mut out = try_filled(len, 0.0, "feather output")?;

    horizontal_pass(mask.as_slice(), &mut tmp, w, &kernel, parallel);
    vertical_pass(&tmp, &mut out, w, h, &kernel, parallel);
    Ok(OpacityBuffer::from_vec(mask.width(), mask.height(), out))
}

/// Normalized taps over `[-r, r]` with `r = ceil(3 sigma)`, capped at `max_radius`.
///
/// Taps beyond the longest mask side only ever read clamped edge pixels.
fn gaussian_kernel(sigma: f32, max_radius: usize) -> BlendResult<Vec<f32>> {
    let sigma = f64::from(sigma);
    let r = (3.0 * sigma).ceil().clamp(1.0, max_radius.max(1) as f64) as i64;
    let denom = 2.0 * sigma * sigma;
    let taps = (2 * r + 1) as usize;

    let mut weights = Vec::new();
    weights
        .try_reserve_exact(taps)
        .map_err(|_| BlendError::out_of_memory(format!("feather kernel: {taps} taps")))?;
    weights.extend((-r..=r).map(|i| {
        let x = i as f64;
        (-x * x / denom).exp()
    }));
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(BlendError::validation("gaussian kernel sum is zero"));
    }
    Ok(weights.into_iter().map(|w| (w / sum) as f32).collect())
}

fn horizontal_pass(src: &[f32], dst: &mut [f32], w: usize, k: &[f32], parallel: bool) {
    let radius = (k.len() / 2) as isize;
    let last = w as isize - 1;
    for_each_row(dst, w, parallel, |y, row| {
        let line = &src[y * w..(y + 1) * w];
        for (x, o) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x as isize + ki as isize - radius).clamp(0, last) as usize;
                acc += kw * line[sx];
            }
            *o = clamp01(acc);
        }
    });
}

fn vertical_pass(src: &[f32], dst: &mut [f32], w: usize, h: usize, k: &[f32], parallel: bool) {
    let radius = (k.len() / 2) as isize;
    let last = h as isize - 1;
    for_each_row(dst, w, parallel, |y, row| {
        for (x, o) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y as isize + ki as isize - radius).clamp(0, last) as usize;
                acc += kw * src[sy * w + x];
            }
            *o = clamp01(acc);
        }
    });
}
