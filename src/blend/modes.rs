use crate::blend::color::ColorSpace;
use crate::foundation::math::{clamp01, lerp, lerp_hue};

/// Arithmetic operator combining a base pixel `a` with a blended pixel `b`.
///
/// Discriminants are the codes stored in persisted blend parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum BlendMode {
    /// Replace, clamped. Superseded by [`BlendMode::Normal2`].
    Normal = 0x01,
    Lighten = 0x02,
    Darken = 0x03,
    Multiply = 0x04,
    Average = 0x05,
    Add = 0x06,
    Subtract = 0x07,
    /// Absolute difference, clamped. Superseded by [`BlendMode::Difference2`].
    Difference = 0x08,
    Screen = 0x09,
    Overlay = 0x0A,
    SoftLight = 0x0B,
    HardLight = 0x0C,
    VividLight = 0x0D,
    LinearLight = 0x0E,
    PinLight = 0x0F,
    Lightness = 0x10,
    Chroma = 0x11,
    Hue = 0x12,
    Color = 0x13,
    /// Replace, clamped. Deprecated alias kept for old records.
    Inverse = 0x14,
    Unbounded = 0x15,
    ColorAdjust = 0x16,
    Difference2 = 0x17,
    Normal2 = 0x18,
    Bounded = 0x19,
    LabLightness = 0x1A,
    LabColor = 0x1B,
}

impl BlendMode {
    pub const ALL: [Self; 27] = [
        Self::Normal,
        Self::Lighten,
        Self::Darken,
        Self::Multiply,
        Self::Average,
        Self::Add,
        Self::Subtract,
        Self::Difference,
        Self::Screen,
        Self::Overlay,
        Self::SoftLight,
        Self::HardLight,
        Self::VividLight,
        Self::LinearLight,
        Self::PinLight,
        Self::Lightness,
        Self::Chroma,
        Self::Hue,
        Self::Color,
        Self::Inverse,
        Self::Unbounded,
        Self::ColorAdjust,
        Self::Difference2,
        Self::Normal2,
        Self::Bounded,
        Self::LabLightness,
        Self::LabColor,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Legacy modes that clamp the operator result to the unit range.
    pub fn is_clamping(self) -> bool {
        matches!(
            self,
            Self::Normal | Self::Difference | Self::Inverse | Self::Unbounded
        )
    }

    /// Per-channel operator, `None` for modes that work on whole colors.
    fn channel_op(self) -> Option<fn(f32, f32) -> f32> {
        let op: fn(f32, f32) -> f32 = match self {
            Self::Normal | Self::Normal2 | Self::Bounded | Self::Unbounded | Self::Inverse => {
                |_, b| b
            }
            Self::Lighten => f32::max,
            Self::Darken => f32::min,
            Self::Multiply => |a, b| a * b,
            Self::Average => |a, b| (a + b) / 2.0,
            Self::Add => |a, b| a + b,
            Self::Subtract => |a, b| a + b - 1.0,
            Self::Difference | Self::Difference2 => |a, b| (a - b).abs(),
            Self::Screen => |a, b| 1.0 - (1.0 - a) * (1.0 - b),
            Self::Overlay => overlay,
            Self::SoftLight => soft_light,
            Self::HardLight => hard_light,
            Self::VividLight => vivid_light,
            Self::LinearLight => |a, b| a + 2.0 * b - 1.0,
            Self::PinLight => pin_light,
            Self::Lightness
            | Self::Chroma
            | Self::Hue
            | Self::Color
            | Self::ColorAdjust
            | Self::LabLightness
            | Self::LabColor => return None,
        };
        Some(op)
    }

    /// Pure operator result for unit-domain colors, before any mask weighting.
    pub(crate) fn operator(self, cs: ColorSpace, a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        let mut f = match self.channel_op() {
            Some(op) => std::array::from_fn(|c| op(a[c], b[c])),
            None => self.color_op(cs, a, b),
        };
        if self.is_clamping() {
            f = f.map(clamp01);
        }
        f
    }

    fn color_op(self, cs: ColorSpace, a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        match (self, cs) {
            (Self::LabLightness, ColorSpace::Lab) => return [b[0], a[1], a[2]],
            (Self::LabColor, ColorSpace::Lab) => return [a[0], b[1], b[2]],
            (Self::ColorAdjust, _) => return b,
            _ => {}
        }

        let ca = cs.to_cylindrical(a);
        let cb = cs.to_cylindrical(b);
        // Lab: (L, C, h). RGB: (H, S, L).
        let (light, chroma, hue) = match cs {
            ColorSpace::Lab => (0, 1, 2),
            ColorSpace::Rgb => (2, 1, 0),
        };
        let mut out = ca;
        match self {
            Self::Lightness | Self::LabLightness => out[light] = cb[light],
            Self::Chroma => out[chroma] = cb[chroma],
            Self::Hue => out[hue] = cb[hue],
            _ => {
                out[chroma] = cb[chroma];
                out[hue] = cb[hue];
            }
        }
        cs.from_cylindrical(out)
    }

    /// Blend one unit-domain color toward the operator result by mask weight `w`.
    pub(crate) fn blend_pixel(self, cs: ColorSpace, a: [f32; 3], b: [f32; 3], w: f32) -> [f32; 3] {
        let w = clamp01(w);
        if self == Self::ColorAdjust {
            let ca = cs.to_cylindrical(a);
            let cb = cs.to_cylindrical(b);
            let hue = cs.hue_index();
            let mixed = std::array::from_fn(|c| {
                if c == hue {
                    lerp_hue(ca[c], cb[c], w)
                } else {
                    lerp(ca[c], cb[c], w)
                }
            });
            return cs.from_cylindrical(mixed);
        }
        let f = self.operator(cs, a, b);
        std::array::from_fn(|c| lerp(a[c], f[c], w))
    }

    /// [`BlendMode::blend_pixel`] on native colors. A zero weight returns `a` bit for bit.
    pub(crate) fn blend_native(self, cs: ColorSpace, a: [f32; 3], b: [f32; 3], w: f32) -> [f32; 3] {
        if clamp01(w) <= 0.0 {
            return a;
        }
        cs.from_unit(self.blend_pixel(cs, cs.to_unit(a), cs.to_unit(b), w))
    }
}

fn overlay(a: f32, b: f32) -> f32 {
    if a > 0.5 {
        1.0 - (1.0 - 2.0 * (a - 0.5)) * (1.0 - b)
    } else {
        2.0 * a * b
    }
}

fn soft_light(a: f32, b: f32) -> f32 {
    if b > 0.5 {
        1.0 - (1.0 - a) * (1.0 - (b - 0.5))
    } else {
        a * (b + 0.5)
    }
}

fn hard_light(a: f32, b: f32) -> f32 {
    if b > 0.5 {
        1.0 - (1.0 - 2.0 * (b - 0.5)) * (1.0 - a)
    } else {
        2.0 * a * b
    }
}

fn vivid_light(a: f32, b: f32) -> f32 {
    if b > 0.5 {
        if b >= 1.0 { 1.0 } else { a / (2.0 * (1.0 - b)) }
    } else if b <= 0.0 {
        0.0
    } else {
        1.0 - (1.0 - a) / (2.0 * b)
    }
}

fn pin_light(a: f32, b: f32) -> f32 {
    if b > 0.5 {
        a.max(2.0 * (b - 0.5))
    } else {
        a.min(2.0 * b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/modes.rs"]
mod tests;
