use smallvec::SmallVec;

use crate::blend::color::{ColorSpace, SIDE_SLOTS, channel_slot};
use crate::blend::params::{BLENDIF_CHANNELS, BLENDIF_POLARITY_SHIFT, BlendParams, MaskCombine};
use crate::foundation::core::OpacityBuffer;
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::try_filled;
use crate::foundation::pool::for_each_row;

/// Pixels per parallel work item when evaluating a gate buffer.
const GATE_CHUNK: usize = 1024;

/// Trapezoid `lo0 -> lo1 -> hi0 -> hi1` over one normalized channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelRange {
    pub lo0: f32,
    pub lo1: f32,
    pub hi0: f32,
    pub hi1: f32,
}

impl ChannelRange {
    pub fn new([lo0, lo1, hi0, hi1]: [f32; 4]) -> Self {
        Self { lo0, lo1, hi0, hi1 }
    }

    /// Inclusion of value `v`: 0 outside `[lo0, hi1]`, 1 inside `[lo1, hi0]`, linear between.
    #[inline]
    pub fn factor(&self, v: f32) -> f32 {
        if v < self.lo0 || v > self.hi1 {
            0.0
        } else if v < self.lo1 {
            (v - self.lo0) / (self.lo1 - self.lo0)
        } else if v <= self.hi0 {
            1.0
        } else {
            (self.hi1 - v) / (self.hi1 - self.hi0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveChannel {
    slot: usize,
    range: ChannelRange,
    invert: bool,
}

impl ActiveChannel {
    #[inline]
    fn factor(&self, values: &[f32; SIDE_SLOTS]) -> f32 {
        let f = self.range.factor(values[self.slot]);
        if self.invert { 1.0 - f } else { f }
    }
}

/// Conditional per-pixel gate driven by the input (base) and output (blended) channels.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendIfGate {
    colorspace: ColorSpace,
    inputs: SmallVec<[ActiveChannel; 8]>,
    outputs: SmallVec<[ActiveChannel; 8]>,
    /// Combine channels by maximum instead of minimum.
    positive: bool,
}

impl BlendIfGate {
    /// Collect the channels `params` activates for `colorspace`; channels the colorspace does
    /// not have are dropped with a warning.
    pub fn new(params: &BlendParams, colorspace: ColorSpace) -> Self {
        let requested = params.blendif & 0xFFFF;
        let valid = requested & colorspace.blendif_mask();
        if valid != requested {
            tracing::warn!(
                ?colorspace,
                ignored = format_args!("{:#06x}", requested & !valid),
                "ignoring conditional channels not available in this colorspace"
            );
        }

        let mut inputs = SmallVec::new();
        let mut outputs = SmallVec::new();
        for ch in (0..BLENDIF_CHANNELS).filter(|ch| valid & (1 << ch) != 0) {
            let (output, slot) = channel_slot(ch);
            let active = ActiveChannel {
                slot,
                range: ChannelRange::new(params.channel_parameters(ch)),
                invert: params.blendif & (1 << (BLENDIF_POLARITY_SHIFT as usize + ch)) != 0,
            };
            if output {
                outputs.push(active);
            } else {
                inputs.push(active);
            }
        }

        Self {
            colorspace,
            inputs,
            outputs,
            positive: params.mask_combine.contains(MaskCombine::MASKS_POS),
        }
    }

    /// No channel active: the gate is 1 everywhere.
    pub fn is_noop(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Gate for one pixel, given its base (`input`) and blended (`output`) colors.
    pub fn evaluate(&self, input: &[f32], output: &[f32]) -> f32 {
        self.side(&self.inputs, input) * self.side(&self.outputs, output)
    }

    fn side(&self, channels: &[ActiveChannel], px: &[f32]) -> f32 {
        if channels.is_empty() {
            return 1.0;
        }
        let values = self.colorspace.blendif_values(px);
        let factors = channels.iter().map(|c| c.factor(&values));
        if self.positive {
            factors.fold(0.0, f32::max)
        } else {
            factors.fold(1.0, f32::min)
        }
    }

    /// Gate for every pixel of two RGBA buffers.
    pub fn gate_buffer(
        &self,
        width: u32,
        height: u32,
        input: &[f32],
        output: &[f32],
        parallel: bool,
    ) -> BlendResult<OpacityBuffer> {
        let n = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| BlendError::validation("gate buffer size overflow"))?;
        if input.len() != n * 4 || output.len() != n * 4 {
            return Err(BlendError::validation(
                "gate_buffer expects rgba inputs matching width*height*4",
            ));
        }
        if self.is_noop() {
            return OpacityBuffer::filled(width, height, 1.0);
        }

        let mut gate = try_filled(n, 0.0, "conditional gate")?;
        for_each_row(&mut gate, GATE_CHUNK, parallel, |j, chunk| {
            let first = j * GATE_CHUNK;
            for (k, g) in chunk.iter_mut().enumerate() {
                let i = (first + k) * 4;
                *g = self.evaluate(&input[i..i + 4], &output[i..i + 4]);
            }
        });
        Ok(OpacityBuffer::from_vec(width, height, gate))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/blendif.rs"]
mod tests;
