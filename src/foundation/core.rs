use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::try_filled;

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Full-resolution size of the image a shape is defined against.
///
/// Normalized shape coordinates are scaled by `width`/`height`, radii by the shorter side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    pub fn new(width: u32, height: u32) -> BlendResult<Self> {
        if width == 0 || height == 0 {
            return Err(BlendError::validation("image dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn min_side(self) -> f64 {
        f64::from(self.width.min(self.height))
    }
}

/// Axis-aligned window into the full image at a given zoom scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl Roi {
    pub fn new(x: i32, y: i32, width: u32, height: u32, scale: f32) -> BlendResult<Self> {
        let roi = Self {
            x,
            y,
            width,
            height,
            scale,
        };
        roi.validate()?;
        Ok(roi)
    }

    /// ROI covering the whole image at scale 1.
    pub fn full(image: ImageDims) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image.width,
            height: image.height,
            scale: 1.0,
        }
    }

    pub fn validate(&self) -> BlendResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(BlendError::validation("roi scale must be finite and > 0"));
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> BlendResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| BlendError::validation("roi pixel count overflow"))
    }
}

/// Integer pixel-space bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelArea {
    /// Smallest integer box containing `rect`.
    pub fn enclosing(rect: Rect) -> Self {
        let x0 = rect.x0.floor();
        let y0 = rect.y0.floor();
        let x1 = rect.x1.ceil().max(x0);
        let y1 = rect.y1.ceil().max(y0);
        Self {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }

    pub fn pixel_count(&self) -> BlendResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| BlendError::validation("area pixel count overflow"))
    }
}

/// Single-channel opacity field in `[0, 1]`, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct OpacityBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl OpacityBuffer {
    pub(crate) fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Allocate a buffer with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> BlendResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| BlendError::validation("opacity buffer size overflow"))?;
        Ok(Self::from_vec(
            width,
            height,
            try_filled(len, value, "opacity buffer")?,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// Knobs for mask rasterization and compositing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Mesh cell size in pixels for ROI rasterization (1 evaluates every pixel).
    pub mesh_stride: u32,
    /// Spread per-row work over rayon.
    pub parallel: bool,
    /// Dedicated worker thread count. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            mesh_stride: 4,
            parallel: true,
            threads: None,
        }
    }
}

impl RasterSettings {
    pub fn validate(&self) -> BlendResult<()> {
        if self.mesh_stride == 0 {
            return Err(BlendError::validation("mesh_stride must be >= 1"));
        }
        if self.threads == Some(0) {
            return Err(BlendError::validation(
                "raster settings 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// Expected length of an RGBA f32 buffer, checked for overflow.
pub fn rgba_len(width: u32, height: u32) -> BlendResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BlendError::validation("rgba buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
