use crate::blend::color::ColorSpace;
use crate::blend::modes::BlendMode;
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::try_filled;
use crate::foundation::pool::for_each_row;

/// Pixels per parallel work item.
const COMPOSITE_CHUNK: usize = 1024;

/// Combine `base` and `blended` RGBA buffers through a per-pixel weight `mask`.
///
/// Each color channel becomes `base + w * (f(base, blended) - base)` with
/// `w = clamp(mask, 0, 1)`; alpha is taken from `base`. Returns a fresh buffer.
pub fn composite(
    base: &[f32],
    blended: &[f32],
    mask: &[f32],
    mode: BlendMode,
    colorspace: ColorSpace,
    parallel: bool,
) -> BlendResult<Vec<f32>> {
    if base.len() != blended.len() || !base.len().is_multiple_of(4) {
        return Err(BlendError::validation(
            "composite expects equal-length rgba f32 buffers",
        ));
    }
    if mask.len().checked_mul(4) != Some(base.len()) {
        return Err(BlendError::validation(
            "composite expects one mask value per pixel",
        ));
    }

    let mut out = try_filled(base.len(), 0.0, "composite output")?;
    for_each_row(&mut out, COMPOSITE_CHUNK * 4, parallel, |j, chunk| {
        let first = j * COMPOSITE_CHUNK;
        for (k, px) in chunk.chunks_exact_mut(4).enumerate() {
            let p = first + k;
            let i = p * 4;
            let a = [base[i], base[i + 1], base[i + 2]];
            let b = [blended[i], blended[i + 1], blended[i + 2]];
            let rgb = mode.blend_native(colorspace, a, b, mask[p]);
            px[..3].copy_from_slice(&rgb);
            px[3] = base[i + 3];
        }
    });
    Ok(out)
}
