use std::ops::{BitOr, BitOrAssign};

use crate::blend::legacy;
use crate::blend::modes::BlendMode;
use crate::foundation::error::{BlendError, BlendResult};

/// Conditional channel slots (four control points each) in a parameter record.
pub const BLENDIF_CHANNELS: usize = 16;
/// Bit 31 of `blendif`: pre-v5 "conditional blending active" flag.
pub const BLENDIF_LEGACY_ACTIVE: u32 = 1 << 31;
/// Polarity bits start here: bit `BLENDIF_POLARITY_SHIFT + c` inverts channel `c`.
pub const BLENDIF_POLARITY_SHIFT: u32 = 16;

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $flag:ident = $value:expr;)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            $($(#[$fmeta])* pub const $flag: Self = Self($value);)*

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn from_bits_retain(bits: u32) -> Self {
                Self(bits)
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set! {
    /// Which mask sources a module blends through.
    MaskMode {
        DISABLED = 0x00;
        /// Blending on; without further bits the mask is the uniform opacity.
        ENABLED = 0x01;
        /// Use the drawn shape mask.
        MASK = 0x02;
        /// Use the conditional (blend-if) gate.
        CONDITIONAL = 0x04;
    }
}

flag_set! {
    /// How drawn mask and conditional gate combine.
    MaskCombine {
        /// Exclusive (intersection), not inverted.
        NORMAL = 0x00;
        INV = 0x01;
        /// Inclusive (union) instead of exclusive.
        INCL = 0x02;
        /// Conditional channels combine by maximum instead of minimum.
        MASKS_POS = 0x04;
    }
}

impl MaskMode {
    pub const fn is_enabled(self) -> bool {
        self.0 & Self::ENABLED.0 != 0
    }
}

/// Blend parameters at the current record version.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlendParams {
    pub mask_mode: MaskMode,
    pub blend_mode: BlendMode,
    /// Percent, `[0, 100]`.
    pub opacity: f32,
    pub mask_combine: MaskCombine,
    pub mask_id: u32,
    /// Bits 0..16 activate conditional channels, bits 16..31 invert them.
    pub blendif: u32,
    /// Mask feather radius in image pixels.
    pub radius: f32,
    #[serde(skip)]
    pub reserved: [u32; 4],
    /// `lo0, lo1, hi0, hi1` per channel, each normalized to the channel range.
    #[serde(with = "blendif_parameters_serde")]
    pub blendif_parameters: [f32; 4 * BLENDIF_CHANNELS],
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            mask_mode: MaskMode::DISABLED,
            blend_mode: BlendMode::Normal2,
            opacity: 100.0,
            mask_combine: MaskCombine::NORMAL,
            mask_id: 0,
            blendif: 0,
            radius: 0.0,
            reserved: [0; 4],
            blendif_parameters: default_blendif_parameters(),
        }
    }
}

/// `[0, 0, 1, 1]` for every channel: fully included everywhere.
pub fn default_blendif_parameters() -> [f32; 4 * BLENDIF_CHANNELS] {
    std::array::from_fn(|i| if i % 4 < 2 { 0.0 } else { 1.0 })
}

impl BlendParams {
    /// Record version this struct encodes to.
    pub const VERSION: u32 = 6;
    /// Size of the binary record.
    pub const ENCODED_LEN: usize = 300;

    pub fn validate(&self) -> BlendResult<()> {
        if !self.opacity.is_finite() || !(0.0..=100.0).contains(&self.opacity) {
            return Err(BlendError::validation(format!(
                "opacity must be within [0, 100], got {}",
                self.opacity
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(BlendError::validation(format!(
                "mask radius must be finite and >= 0, got {}",
                self.radius
            )));
        }
        if self.blendif_parameters.iter().any(|v| !v.is_finite()) {
            return Err(BlendError::validation(
                "blendif parameters must be finite",
            ));
        }
        Ok(())
    }

    /// Opacity as a `[0, 1]` weight.
    pub fn opacity_fraction(&self) -> f32 {
        (self.opacity / 100.0).clamp(0.0, 1.0)
    }

    pub fn channel_parameters(&self, channel: usize) -> [f32; 4] {
        let base = 4 * channel;
        [
            self.blendif_parameters[base],
            self.blendif_parameters[base + 1],
            self.blendif_parameters[base + 2],
            self.blendif_parameters[base + 3],
        ]
    }

    /// Little-endian version 6 record.
    pub fn to_bytes(&self) -> Vec<u8> {
        legacy::encode_current(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> BlendResult<Self> {
        legacy::decode_current(bytes)
    }
}

mod blendif_parameters_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BLENDIF_CHANNELS;

    pub fn serialize<S: Serializer>(
        v: &[f32; 4 * BLENDIF_CHANNELS],
        s: S,
    ) -> Result<S::Ok, S::Error> {
        s.collect_seq(v.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<[f32; 4 * BLENDIF_CHANNELS], D::Error> {
        let v = Vec::<f32>::deserialize(d)?;
        let len = v.len();
        v.try_into().map_err(|_| {
            D::Error::custom(format!(
                "expected {} blendif parameters, got {len}",
                4 * BLENDIF_CHANNELS
            ))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/params.rs"]
mod tests;
