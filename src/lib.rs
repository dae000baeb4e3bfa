#![forbid(unsafe_code)]
//! Drawn-mask rasterization and conditional blending for image-processing pipelines.
//!
//! The crate is organized in four layers:
//!
//! - [`transform`]: priority-ordered distortion chains mapping points between the
//!   undistorted image and a module's output space.
//! - [`masks`]: circle shapes rasterized through a transform, with mesh interpolation and
//!   Gaussian feathering.
//! - [`blend`]: the blend operators, the conditional ("blend if") gate and the versioned
//!   parameter records.
//! - [`render`]: the end-to-end driver combining drawn mask, gate and opacity.
//!
//! Pixel buffers are row-major RGBA `f32`. Lab buffers carry `L` in `[0, 100]` and `a`/`b`
//! in `[-128, 128]`; RGB buffers are nominally in `[0, 1]`.

mod foundation;

pub mod blend;
pub mod masks;
pub mod render;
pub mod transform;

pub use blend::{
    BlendIfGate, BlendMode, BlendParams, ChannelRange, ColorSpace, MaskCombine, MaskMode,
    VersionedParams, composite, upgrade, upgrade_blend_params,
};
pub use foundation::core::{
    Affine, ImageDims, OpacityBuffer, PixelArea, Point, RasterSettings, Rect, Roi, Vec2,
    rgba_len,
};
pub use foundation::error::{BlendError, BlendResult};
pub use masks::{Circle, MaskContext, Shape, feather, rasterize};
pub use render::{BlendRequest, blend_process, build_mask};
pub use transform::{
    AffineOp, CoordinateTransform, DistortKind, DistortOp, DistortionChain, Identity, LensOp,
    PriorityRange,
};
