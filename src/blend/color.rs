use std::f32::consts::{SQRT_2, TAU};

/// Colorspace a pixel buffer is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// CIE Lab: L in `[0, 100]`, a/b roughly `[-128, 128]`.
    Lab,
    /// Linear RGB in `[0, 1]`.
    Rgb,
}

/// Lab conditional channels: L, a, b and C, h, for input and output.
pub const BLENDIF_LAB_MASK: u32 = 0x3377;
/// RGB conditional channels: gray, R, G, B and H, S, L, for input and output.
pub const BLENDIF_RGB_MASK: u32 = 0x77FF;

/// Number of conditional channel slots per side (input or output).
pub(crate) const SIDE_SLOTS: usize = 8;

const LAB_MIN: [f32; 3] = [0.0, -128.0, -128.0];
const LAB_MAX: [f32; 3] = [100.0, 128.0, 128.0];

impl ColorSpace {
    /// Conditional channel bits valid in this colorspace.
    pub fn blendif_mask(self) -> u32 {
        match self {
            Self::Lab => BLENDIF_LAB_MASK,
            Self::Rgb => BLENDIF_RGB_MASK,
        }
    }

    /// Map native color channels to the unit domain blend operators work in.
    #[inline]
    pub(crate) fn to_unit(self, px: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Lab => std::array::from_fn(|c| (px[c] - LAB_MIN[c]) / (LAB_MAX[c] - LAB_MIN[c])),
            Self::Rgb => px,
        }
    }

    #[inline]
    pub(crate) fn from_unit(self, u: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Lab => std::array::from_fn(|c| LAB_MIN[c] + u[c] * (LAB_MAX[c] - LAB_MIN[c])),
            Self::Rgb => u,
        }
    }

    /// Cylindrical form of a unit-domain color.
    ///
    /// Lab gives `(L, C, h)`, RGB gives `(H, S, L)`; hue is in turns.
    pub(crate) fn to_cylindrical(self, u: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Lab => {
                let (c, h) = chroma_hue(u[1] - 0.5, u[2] - 0.5);
                [u[0], c, h]
            }
            Self::Rgb => {
                let (h, s, l) = rgb_to_hsl(u[0], u[1], u[2]);
                [h, s, l]
            }
        }
    }

    pub(crate) fn from_cylindrical(self, v: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Lab => {
                let (s, c) = (v[2] * TAU).sin_cos();
                [v[0], 0.5 + v[1] * c, 0.5 + v[1] * s]
            }
            Self::Rgb => {
                let (r, g, b) = hsl_to_rgb(v[0], v[1], v[2]);
                [r, g, b]
            }
        }
    }

    /// Index of the hue component in [`ColorSpace::to_cylindrical`] output.
    pub(crate) fn hue_index(self) -> usize {
        match self {
            Self::Lab => 2,
            Self::Rgb => 0,
        }
    }

    /// Normalized conditional channel values of one pixel, by slot.
    ///
    /// Slots 0..4 are the direct channels (Lab: L, a, b; RGB: gray, R, G, B), slots 4..8 the
    /// cylindrical ones (Lab: C, h; RGB: H, S, L). Unused slots are 0.
    pub(crate) fn blendif_values(self, px: &[f32]) -> [f32; SIDE_SLOTS] {
        let mut out = [0.0; SIDE_SLOTS];
        match self {
            Self::Lab => {
                let (l, a, b) = (px[0], px[1], px[2]);
                let (c, h) = chroma_hue(a, b);
                out[0] = l / 100.0;
                out[1] = (a + 128.0) / 256.0;
                out[2] = (b + 128.0) / 256.0;
                out[4] = c / (128.0 * SQRT_2);
                out[5] = h;
            }
            Self::Rgb => {
                let (r, g, b) = (px[0], px[1], px[2]);
                let (h, s, l) = rgb_to_hsl(r, g, b);
                out[0] = 0.3 * r + 0.59 * g + 0.11 * b;
                out[1] = r;
                out[2] = g;
                out[3] = b;
                out[4] = h;
                out[5] = s;
                out[6] = l;
            }
        }
        out
    }
}

/// Split a conditional channel index into (is output side, slot).
#[inline]
pub(crate) fn channel_slot(channel: usize) -> (bool, usize) {
    let output = channel & 4 != 0;
    let slot = (channel & 3) + if channel >= 8 { 4 } else { 0 };
    (output, slot)
}

/// Chroma and hue (in turns, `[0, 1)`) of an a/b pair.
#[inline]
fn chroma_hue(a: f32, b: f32) -> (f32, f32) {
    let c = a.hypot(b);
    let h = b.atan2(a).rem_euclid(TAU) / TAU;
    (c, if h >= 1.0 { 0.0 } else { h })
}

/// RGB to HSL, all components in `[0, 1]`, hue in turns.
pub(crate) fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d.abs() < 1e-6 {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

pub(crate) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s.abs() < 1e-6 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/color.rs"]
mod tests;
