use std::fmt;

use crate::foundation::core::{ImageDims, OpacityBuffer, PixelArea, Point, RasterSettings, Roi};
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::pool;
use crate::masks::circle::{Circle, CircleFalloff, sample_outline};
use crate::masks::raster::{outline_bounds, rasterize_dense, rasterize_mesh};
use crate::transform::{CoordinateTransform, Direction, PriorityRange, map_points};

/// Everything a shape needs from the surrounding pipeline to rasterize itself.
#[derive(Clone, Copy)]
pub struct MaskContext<'a> {
    /// Full input image the normalized shape coordinates refer to.
    pub image: ImageDims,
    pub transform: &'a dyn CoordinateTransform,
    /// Operators of `transform` that sit before the consuming module.
    pub range: PriorityRange,
    pub settings: RasterSettings,
}

impl<'a> MaskContext<'a> {
    pub fn new(image: ImageDims, transform: &'a dyn CoordinateTransform) -> Self {
        Self {
            image,
            transform,
            range: PriorityRange::ALL,
            settings: RasterSettings::default(),
        }
    }

    pub fn with_range(mut self, range: PriorityRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_settings(mut self, settings: RasterSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl fmt::Debug for MaskContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskContext")
            .field("image", &self.image)
            .field("range", &self.range)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Parametric mask region.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle(Circle),
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl Shape {
    pub fn validate(&self) -> BlendResult<()> {
        match self {
            Self::Circle(c) => c.validate(),
        }
    }

    /// Pipeline-space pixel box covering the distorted shape, border included.
    #[tracing::instrument(level = "debug", skip(ctx))]
    pub fn area(&self, ctx: &MaskContext<'_>) -> BlendResult<PixelArea> {
        self.validate()?;
        match self {
            Self::Circle(c) => distorted_area(ctx, c.center_px(ctx.image), c.total_px(ctx.image)),
        }
    }

    /// Pipeline-space pixel box covering the clone source outline.
    #[tracing::instrument(level = "debug", skip(ctx))]
    pub fn source_area(&self, ctx: &MaskContext<'_>) -> BlendResult<PixelArea> {
        self.validate()?;
        match self {
            Self::Circle(c) => {
                let source = c
                    .source_px(ctx.image)
                    .ok_or_else(|| BlendError::invalid_shape("circle has no source position"))?;
                distorted_area(ctx, source, c.total_px(ctx.image))
            }
        }
    }

    /// Full-resolution mask over [`Shape::area`], evaluated at every pixel.
    #[tracing::instrument(level = "debug", skip(ctx))]
    pub fn mask(&self, ctx: &MaskContext<'_>) -> BlendResult<(PixelArea, OpacityBuffer)> {
        let area = self.area(ctx)?;
        let buf = pool::install(&ctx.settings, || {
            rasterize_dense(
                area,
                ctx.transform,
                ctx.range,
                ctx.settings.parallel,
                self.opacity_fn(ctx.image),
            )
        })??;
        Ok((area, buf))
    }

    /// Mask over `roi`, sampled on a mesh and reconstructed bilinearly.
    #[tracing::instrument(level = "debug", skip(ctx))]
    pub fn mask_roi(&self, ctx: &MaskContext<'_>, roi: &Roi) -> BlendResult<OpacityBuffer> {
        pool::install(&ctx.settings, || self.render_roi(ctx, roi))?
    }

    /// [`Shape::mask_roi`] on the caller's rayon pool.
    pub(crate) fn render_roi(&self, ctx: &MaskContext<'_>, roi: &Roi) -> BlendResult<OpacityBuffer> {
        self.validate()?;
        ctx.settings.validate()?;
        rasterize_mesh(
            roi,
            ctx.settings.mesh_stride,
            ctx.transform,
            ctx.range,
            ctx.settings.parallel,
            self.opacity_fn(ctx.image),
        )
    }

    /// Center followed by the distorted outline, for drawing the shape over the image.
    ///
    /// `with_border` selects the outer (falloff) outline instead of the core one.
    pub fn outline_points(
        &self,
        ctx: &MaskContext<'_>,
        with_border: bool,
    ) -> BlendResult<Vec<Point>> {
        self.validate()?;
        let mut points = match self {
            Self::Circle(c) => {
                let center = c.center_px(ctx.image);
                let r = if with_border {
                    c.total_px(ctx.image)
                } else {
                    c.radius_px(ctx.image)
                };
                let ring = sample_outline(center, r)?;
                let mut points = Vec::new();
                points
                    .try_reserve_exact(ring.len() + 1)
                    .map_err(|_| BlendError::out_of_memory("circle outline"))?;
                points.push(center);
                points.extend(ring);
                points
            }
        };
        map_points(
            ctx.transform,
            &mut points,
            ctx.range,
            Direction::Forward,
            ctx.settings.parallel,
        )?;
        Ok(points)
    }

    fn opacity_fn(&self, image: ImageDims) -> impl Fn(Point) -> f32 + Sync + use<> {
        let falloff = match self {
            Self::Circle(c) => CircleFalloff::new(c, image),
        };
        move |p| falloff.opacity(p)
    }
}

/// Rasterize `shape` over `roi` through the context's distortion chain.
pub fn rasterize(shape: &Shape, ctx: &MaskContext<'_>, roi: &Roi) -> BlendResult<OpacityBuffer> {
    shape.mask_roi(ctx, roi)
}

fn distorted_area(ctx: &MaskContext<'_>, center: Point, radius_px: f64) -> BlendResult<PixelArea> {
    let mut points = sample_outline(center, radius_px)?;
    map_points(
        ctx.transform,
        &mut points,
        ctx.range,
        Direction::Forward,
        ctx.settings.parallel,
    )?;
    let bounds = outline_bounds(&points)
        .ok_or_else(|| BlendError::transform("distorted outline has no finite bounds"))?;
    Ok(PixelArea::enclosing(bounds))
}

#[cfg(test)]
#[path = "../../tests/unit/masks/shape.rs"]
mod tests;
