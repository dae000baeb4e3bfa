//! Persisted blend parameter records, versions 1 through 6, and the upgrade chain between
//! them.
//!
//! Every record is a packed little-endian sequence of 32-bit fields:
//!
//! | version | bytes | fields |
//! |---------|-------|--------|
//! | 1 | 12  | `mode, opacity, mask_id` |
//! | 2 | 144 | `mode, opacity, mask_id, blendif, params[32]` |
//! | 3 | 272 | `mode, opacity, mask_id, blendif, params[64]` |
//! | 4 | 276 | `mode, opacity, mask_id, blendif, radius, params[64]` |
//! | 5, 6 | 300 | `mask_mode, blend_mode, opacity, mask_combine, mask_id, blendif, radius, reserved[4], params[64]` |
//!
//! Before version 5 `mode` carries the blend mode in its low bits, 0 meaning "off", and
//! bit 0x80 selects the drawn mask.

use crate::blend::modes::BlendMode;
use crate::blend::params::{BLENDIF_LEGACY_ACTIVE, BlendParams, MaskCombine, MaskMode};
use crate::foundation::error::{BlendError, BlendResult};

/// Pre-v5 `mode` bit selecting the drawn mask.
pub const LEGACY_MASK_FLAG: u32 = 0x80;

/// Oldest record version still understood.
pub const MIN_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendParamsV1 {
    pub mode: u32,
    pub opacity: f32,
    pub mask_id: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendParamsV2 {
    pub mode: u32,
    pub opacity: f32,
    pub mask_id: u32,
    pub blendif: u32,
    pub blendif_parameters: [f32; 32],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendParamsV3 {
    pub mode: u32,
    pub opacity: f32,
    pub mask_id: u32,
    pub blendif: u32,
    pub blendif_parameters: [f32; 64],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendParamsV4 {
    pub mode: u32,
    pub opacity: f32,
    pub mask_id: u32,
    pub blendif: u32,
    pub radius: f32,
    pub blendif_parameters: [f32; 64],
}

/// A decoded record of any known version.
#[derive(Clone, Debug, PartialEq)]
pub enum VersionedParams {
    V1(BlendParamsV1),
    V2(BlendParamsV2),
    V3(BlendParamsV3),
    V4(BlendParamsV4),
    V5(BlendParams),
    V6(BlendParams),
}

/// Byte length of a record at `version`.
pub fn encoded_len(version: u32) -> BlendResult<usize> {
    Ok(match version {
        1 => 12,
        2 => 144,
        3 => 272,
        4 => 276,
        5 | 6 => BlendParams::ENCODED_LEN,
        other => return Err(BlendError::unsupported_version(other)),
    })
}

impl VersionedParams {
    pub fn version(&self) -> u32 {
        match self {
            Self::V1(_) => 1,
            Self::V2(_) => 2,
            Self::V3(_) => 3,
            Self::V4(_) => 4,
            Self::V5(_) => 5,
            Self::V6(_) => 6,
        }
    }

    pub fn decode(version: u32, bytes: &[u8]) -> BlendResult<Self> {
        let expected = encoded_len(version)?;
        if bytes.len() != expected {
            return Err(BlendError::serde(format!(
                "version {version} blend params must be {expected} bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = Reader::new(bytes);
        let decoded = match version {
            1 => Self::V1(BlendParamsV1 {
                mode: r.u32()?,
                opacity: r.f32()?,
                mask_id: r.u32()?,
            }),
            2 => Self::V2(BlendParamsV2 {
                mode: r.u32()?,
                opacity: r.f32()?,
                mask_id: r.u32()?,
                blendif: r.u32()?,
                blendif_parameters: r.f32_array()?,
            }),
            3 => Self::V3(BlendParamsV3 {
                mode: r.u32()?,
                opacity: r.f32()?,
                mask_id: r.u32()?,
                blendif: r.u32()?,
                blendif_parameters: r.f32_array()?,
            }),
            4 => Self::V4(BlendParamsV4 {
                mode: r.u32()?,
                opacity: r.f32()?,
                mask_id: r.u32()?,
                blendif: r.u32()?,
                radius: r.f32()?,
                blendif_parameters: r.f32_array()?,
            }),
            5 => Self::V5(read_current(&mut r)?),
            _ => Self::V6(read_current(&mut r)?),
        };
        Ok(decoded)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::default();
        match self {
            Self::V1(p) => {
                w.u32(p.mode);
                w.f32(p.opacity);
                w.u32(p.mask_id);
            }
            Self::V2(p) => {
                w.u32(p.mode);
                w.f32(p.opacity);
                w.u32(p.mask_id);
                w.u32(p.blendif);
                w.f32_slice(&p.blendif_parameters);
            }
            Self::V3(p) => {
                w.u32(p.mode);
                w.f32(p.opacity);
                w.u32(p.mask_id);
                w.u32(p.blendif);
                w.f32_slice(&p.blendif_parameters);
            }
            Self::V4(p) => {
                w.u32(p.mode);
                w.f32(p.opacity);
                w.u32(p.mask_id);
                w.u32(p.blendif);
                w.f32(p.radius);
                w.f32_slice(&p.blendif_parameters);
            }
            Self::V5(p) | Self::V6(p) => write_current(&mut w, p),
        }
        w.into_bytes()
    }

    /// Advance exactly one version. The current version maps to itself.
    ///
    /// Every step is infallible except v4 to v5, which returns [`BlendError::Serde`] when
    /// the packed `mode` holds a blend mode code no version ever defined.
    pub fn upgrade_step(self) -> BlendResult<Self> {
        Ok(match self {
            Self::V1(p) => Self::V2(BlendParamsV2 {
                mode: p.mode,
                opacity: p.opacity,
                mask_id: p.mask_id,
                blendif: 0,
                blendif_parameters: [0.0; 32],
            }),
            Self::V2(p) => {
                let mut blendif_parameters = [0.0; 64];
                blendif_parameters[..32].copy_from_slice(&p.blendif_parameters);
                Self::V3(BlendParamsV3 {
                    mode: p.mode,
                    opacity: p.opacity,
                    mask_id: p.mask_id,
                    blendif: p.blendif,
                    blendif_parameters,
                })
            }
            Self::V3(p) => Self::V4(BlendParamsV4 {
                mode: p.mode,
                opacity: p.opacity,
                mask_id: p.mask_id,
                blendif: p.blendif,
                radius: 0.0,
                blendif_parameters: p.blendif_parameters,
            }),
            Self::V4(p) => Self::V5(split_mode(&p)?),
            Self::V5(p) => Self::V6(p),
            Self::V6(p) => Self::V6(p),
        })
    }

    /// Chain single steps until `target` is reached.
    pub fn upgrade_to(self, target: u32) -> BlendResult<Self> {
        encoded_len(target)?;
        let from = self.version();
        if target < from {
            return Err(BlendError::validation(format!(
                "cannot downgrade blend params from version {from} to {target}"
            )));
        }
        let mut current = self;
        while current.version() < target {
            current = current.upgrade_step()?;
        }
        Ok(current)
    }

    pub fn into_current(self) -> BlendResult<BlendParams> {
        match self.upgrade_to(BlendParams::VERSION)? {
            Self::V6(p) => Ok(p),
            other => Err(BlendError::validation(format!(
                "upgrade stopped at version {}",
                other.version()
            ))),
        }
    }
}

/// Decode a record at `old_version` and upgrade it to `new_version`.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn upgrade_blend_params(
    old_version: u32,
    bytes: &[u8],
    new_version: u32,
) -> BlendResult<VersionedParams> {
    encoded_len(new_version)?;
    let upgraded = VersionedParams::decode(old_version, bytes)?.upgrade_to(new_version)?;
    tracing::debug!(old_version, new_version, "blend params upgraded");
    Ok(upgraded)
}

/// Decode a record at `version` straight into current parameters.
pub fn upgrade(version: u32, bytes: &[u8]) -> BlendResult<BlendParams> {
    VersionedParams::decode(version, bytes)?.into_current()
}

/// v4 to v5: split the packed `mode` into mask mode and blend mode.
fn split_mode(p: &BlendParamsV4) -> BlendResult<BlendParams> {
    let code = p.mode & !LEGACY_MASK_FLAG;
    let (mask_mode, blend_mode) = if code == 0 {
        (MaskMode::DISABLED, BlendMode::Normal2)
    } else {
        let blend_mode = BlendMode::from_code(code).ok_or_else(|| {
            BlendError::serde(format!("unknown legacy blend mode 0x{code:02x}"))
        })?;
        let mut mask_mode = MaskMode::ENABLED;
        if p.blendif & BLENDIF_LEGACY_ACTIVE != 0 {
            mask_mode |= MaskMode::CONDITIONAL;
        }
        if p.mode & LEGACY_MASK_FLAG != 0 {
            mask_mode |= MaskMode::MASK;
        }
        (mask_mode, blend_mode)
    };

    Ok(BlendParams {
        mask_mode,
        blend_mode,
        opacity: p.opacity,
        mask_combine: MaskCombine::NORMAL,
        mask_id: p.mask_id,
        blendif: p.blendif & !BLENDIF_LEGACY_ACTIVE,
        radius: p.radius,
        reserved: [0; 4],
        blendif_parameters: p.blendif_parameters,
    })
}

pub(crate) fn encode_current(p: &BlendParams) -> Vec<u8> {
    let mut w = Writer::default();
    write_current(&mut w, p);
    w.into_bytes()
}

pub(crate) fn decode_current(bytes: &[u8]) -> BlendResult<BlendParams> {
    match VersionedParams::decode(BlendParams::VERSION, bytes)? {
        VersionedParams::V6(p) => Ok(p),
        other => Err(BlendError::serde(format!(
            "decoded version {} instead of {}",
            other.version(),
            BlendParams::VERSION
        ))),
    }
}

fn read_current(r: &mut Reader<'_>) -> BlendResult<BlendParams> {
    let mask_mode = MaskMode::from_bits_retain(r.u32()?);
    let code = r.u32()?;
    let blend_mode = BlendMode::from_code(code)
        .ok_or_else(|| BlendError::serde(format!("unknown blend mode 0x{code:02x}")))?;
    Ok(BlendParams {
        mask_mode,
        blend_mode,
        opacity: r.f32()?,
        mask_combine: MaskCombine::from_bits_retain(r.u32()?),
        mask_id: r.u32()?,
        blendif: r.u32()?,
        radius: r.f32()?,
        reserved: [r.u32()?, r.u32()?, r.u32()?, r.u32()?],
        blendif_parameters: r.f32_array()?,
    })
}

fn write_current(w: &mut Writer, p: &BlendParams) {
    w.u32(p.mask_mode.bits());
    w.u32(p.blend_mode.code());
    w.f32(p.opacity);
    w.u32(p.mask_combine.bits());
    w.u32(p.mask_id);
    w.u32(p.blendif);
    w.f32(p.radius);
    for v in p.reserved {
        w.u32(v);
    }
    w.f32_slice(&p.blendif_parameters);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn u32(&mut self) -> BlendResult<u32> {
        let end = self.pos + 4;
        let chunk: [u8; 4] = self
            .bytes
            .get(self.pos..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| BlendError::serde(format!("record truncated at byte {}", self.pos)))?;
        self.pos = end;
        Ok(u32::from_le_bytes(chunk))
    }

    fn f32(&mut self) -> BlendResult<f32> {
        Ok(f32::from_bits(self.u32()?))
    }

    fn f32_array<const N: usize>(&mut self) -> BlendResult<[f32; N]> {
        let mut out = [0.0; N];
        for v in &mut out {
            *v = self.f32()?;
        }
        Ok(out)
    }
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn f32_slice(&mut self, values: &[f32]) {
        for &v in values {
            self.f32(v);
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/legacy.rs"]
mod tests;
