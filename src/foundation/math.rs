use crate::foundation::core::Point;
use crate::foundation::error::{BlendError, BlendResult};

/// Allocate `len` floats set to `value`, reporting allocation failure instead of aborting.
pub(crate) fn try_filled(len: usize, value: f32, what: &str) -> BlendResult<Vec<f32>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| BlendError::out_of_memory(format!("{what}: {len} floats")))?;
    out.resize(len, value);
    Ok(out)
}

pub(crate) fn try_points(len: usize, what: &str) -> BlendResult<Vec<Point>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| BlendError::out_of_memory(format!("{what}: {len} points")))?;
    out.resize(len, Point::ZERO);
    Ok(out)
}

#[inline]
pub(crate) fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Shortest-arc interpolation of hues expressed in turns (`[0, 1)`).
pub(crate) fn lerp_hue(a: f32, b: f32, t: f32) -> f32 {
    let mut d = b - a;
    if d > 0.5 {
        d -= 1.0;
    } else if d < -0.5 {
        d += 1.0;
    }
    (a + d * t).rem_euclid(1.0)
}
