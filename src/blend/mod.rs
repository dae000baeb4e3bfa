//! Blend operators, conditional gating and the persisted parameter records that drive them.

mod blendif;
mod color;
mod compositor;
pub mod legacy;
mod modes;
mod params;

pub use blendif::{BlendIfGate, ChannelRange};
pub use color::{BLENDIF_LAB_MASK, BLENDIF_RGB_MASK, ColorSpace};
pub use compositor::composite;
pub use legacy::{VersionedParams, upgrade, upgrade_blend_params};
pub use modes::BlendMode;
pub use params::{
    BLENDIF_CHANNELS, BLENDIF_LEGACY_ACTIVE, BLENDIF_POLARITY_SHIFT, BlendParams, MaskCombine,
    MaskMode, default_blendif_parameters,
};
