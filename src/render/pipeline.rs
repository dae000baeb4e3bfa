use crate::blend::{BlendIfGate, BlendParams, ColorSpace, MaskCombine, MaskMode, composite};
use crate::foundation::core::{OpacityBuffer, Roi, rgba_len};
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::{clamp01, try_filled};
use crate::foundation::pool::{self, for_each_row};
use crate::masks::{MaskContext, Shape, feather};

/// Pixels per parallel work item when combining masks.
const COMBINE_CHUNK: usize = 1024;

/// Pixel buffers and geometry of one blend call.
///
/// `input` and `output` are RGBA `f32` buffers covering `roi`, row-major with a pitch of
/// `roi.width * 4`.
#[derive(Clone, Copy)]
pub struct BlendRequest<'a> {
    pub colorspace: ColorSpace,
    pub roi: Roi,
    /// Module input: the base of the blend.
    pub input: &'a [f32],
    /// Module output: blended over `input`.
    pub output: &'a [f32],
    /// Drawn shape used when the parameters ask for a drawn mask.
    pub shape: Option<&'a Shape>,
}

impl<'a> BlendRequest<'a> {
    pub fn new(colorspace: ColorSpace, roi: Roi, input: &'a [f32], output: &'a [f32]) -> Self {
        Self {
            colorspace,
            roi,
            input,
            output,
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: &'a Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    fn validate(&self) -> BlendResult<()> {
        self.roi.validate()?;
        let expected = rgba_len(self.roi.width, self.roi.height)?;
        if self.input.len() != expected || self.output.len() != expected {
            return Err(BlendError::validation(format!(
                "blend buffers must hold {expected} floats (roi {}x{} rgba)",
                self.roi.width, self.roi.height
            )));
        }
        Ok(())
    }
}

/// One mask operand: either the same value everywhere or a per-pixel buffer.
enum MaskSource {
    Uniform(f32),
    Buffer(OpacityBuffer),
}

impl MaskSource {
    #[inline]
    fn at(&self, p: usize) -> f32 {
        match self {
            Self::Uniform(v) => *v,
            Self::Buffer(b) => b.as_slice()[p],
        }
    }
}

/// Blend `request.output` over `request.input` as `params` describe.
///
/// Disabled parameters return a copy of `request.output` without evaluating any mask.
#[tracing::instrument(
    skip(params, request, ctx),
    fields(
        mode = ?params.blend_mode,
        width = request.roi.width,
        height = request.roi.height
    )
)]
pub fn blend_process(
    params: &BlendParams,
    request: &BlendRequest<'_>,
    ctx: &MaskContext<'_>,
) -> BlendResult<Vec<f32>> {
    request.validate()?;
    params.validate()?;
    ctx.settings.validate()?;

    if !params.mask_mode.is_enabled() {
        tracing::debug!("blending disabled, passing module output through");
        let mut out = Vec::new();
        out.try_reserve_exact(request.output.len())
            .map_err(|_| BlendError::out_of_memory("blend output copy"))?;
        out.extend_from_slice(request.output);
        return Ok(out);
    }

    pool::install(&ctx.settings, || {
        let mask = combined_mask(params, request, ctx)?;
        composite(
            request.input,
            request.output,
            mask.as_slice(),
            params.blend_mode,
            request.colorspace,
            ctx.settings.parallel,
        )
    })?
}

/// Final per-pixel weight `blend_process` would composite with.
///
/// Disabled parameters pass the module output through, which a mask of 1 represents.
pub fn build_mask(
    params: &BlendParams,
    request: &BlendRequest<'_>,
    ctx: &MaskContext<'_>,
) -> BlendResult<OpacityBuffer> {
    request.validate()?;
    params.validate()?;
    ctx.settings.validate()?;
    if !params.mask_mode.is_enabled() {
        return OpacityBuffer::filled(request.roi.width, request.roi.height, 1.0);
    }
    pool::install(&ctx.settings, || combined_mask(params, request, ctx))?
}

fn combined_mask(
    params: &BlendParams,
    request: &BlendRequest<'_>,
    ctx: &MaskContext<'_>,
) -> BlendResult<OpacityBuffer> {
    let roi = request.roi;
    let mode = params.mask_mode;
    let opacity = params.opacity_fraction();

    if !mode.contains(MaskMode::MASK) && !mode.contains(MaskMode::CONDITIONAL) {
        return OpacityBuffer::filled(roi.width, roi.height, opacity);
    }

    let inclusive = params.mask_combine.contains(MaskCombine::INCL);
    let invert = params.mask_combine.contains(MaskCombine::INV);
    let neutral = if inclusive { 0.0 } else { 1.0 };
    let parallel = ctx.settings.parallel;

    let drawn = match request.shape {
        Some(shape) if mode.contains(MaskMode::MASK) => {
            MaskSource::Buffer(shape.render_roi(ctx, &roi)?)
        }
        _ => MaskSource::Uniform(neutral),
    };
    let gate = if mode.contains(MaskMode::CONDITIONAL) {
        let gate = BlendIfGate::new(params, request.colorspace);
        if gate.is_noop() {
            MaskSource::Uniform(1.0)
        } else {
            MaskSource::Buffer(gate.gate_buffer(
                roi.width,
                roi.height,
                request.input,
                request.output,
                parallel,
            )?)
        }
    } else {
        MaskSource::Uniform(neutral)
    };

    let mut mask = try_filled(roi.pixel_count()?, 0.0, "combined mask")?;
    for_each_row(&mut mask, COMBINE_CHUNK, parallel, |j, chunk| {
        let first = j * COMBINE_CHUNK;
        for (k, m) in chunk.iter_mut().enumerate() {
            let p = first + k;
            let (d, g) = (drawn.at(p), gate.at(p));
            let mut v = if inclusive {
                1.0 - (1.0 - d) * (1.0 - g)
            } else {
                d * g
            };
            if invert {
                v = 1.0 - v;
            }
            *m = clamp01(v * opacity);
        }
    });
    let mask = OpacityBuffer::from_vec(roi.width, roi.height, mask);

    let sigma = params.radius * roi.scale;
    if sigma > 0.0 {
        feather(&mask, sigma, parallel)
    } else {
        Ok(mask)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
