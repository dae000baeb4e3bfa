use std::f64::consts::TAU;

use crate::foundation::core::{ImageDims, Point, Vec2};
use crate::foundation::error::{BlendError, BlendResult};
use crate::foundation::math::try_points;

/// Fewest outline samples, whatever the radius.
const MIN_OUTLINE_POINTS: usize = 8;

/// Circle with a soft border, in normalized image coordinates.
///
/// `radius` and `border` are fractions of the shorter image side. `source` is the center a
/// clone-type consumer reads pixels from; it shares the radius and border.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Circle {
    pub center: (f32, f32),
    pub radius: f32,
    #[serde(default)]
    pub border: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<(f32, f32)>,
}

impl Circle {
    pub fn new(center: (f32, f32), radius: f32, border: f32) -> BlendResult<Self> {
        let circle = Self {
            center,
            radius,
            border,
            source: None,
        };
        circle.validate()?;
        Ok(circle)
    }

    pub fn with_source(mut self, source: (f32, f32)) -> BlendResult<Self> {
        self.source = Some(source);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> BlendResult<()> {
        let (cx, cy) = self.center;
        if !cx.is_finite() || !cy.is_finite() {
            return Err(BlendError::invalid_shape("circle center must be finite"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 || self.radius > 0.5 {
            return Err(BlendError::invalid_shape(format!(
                "circle radius must be in (0, 0.5], got {}",
                self.radius
            )));
        }
        if !self.border.is_finite() || self.border < 0.0 {
            return Err(BlendError::invalid_shape(format!(
                "circle border must be finite and >= 0, got {}",
                self.border
            )));
        }
        if let Some((sx, sy)) = self.source
            && (!sx.is_finite() || !sy.is_finite())
        {
            return Err(BlendError::invalid_shape("circle source must be finite"));
        }
        Ok(())
    }

    /// Center in image pixels.
    pub(crate) fn center_px(&self, image: ImageDims) -> Point {
        to_pixels(self.center, image)
    }

    pub(crate) fn source_px(&self, image: ImageDims) -> Option<Point> {
        self.source.map(|s| to_pixels(s, image))
    }

    pub(crate) fn radius_px(&self, image: ImageDims) -> f64 {
        f64::from(self.radius) * image.min_side()
    }

    /// Radius including the border band, in image pixels.
    pub(crate) fn total_px(&self, image: ImageDims) -> f64 {
        (f64::from(self.radius) + f64::from(self.border)) * image.min_side()
    }
}

fn to_pixels((x, y): (f32, f32), image: ImageDims) -> Point {
    Point::new(
        f64::from(x) * f64::from(image.width),
        f64::from(y) * f64::from(image.height),
    )
}

/// Analytic opacity of a circle in undistorted image space.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CircleFalloff {
    center: Point,
    radius2: f64,
    total2: f64,
}

impl CircleFalloff {
    pub(crate) fn new(circle: &Circle, image: ImageDims) -> Self {
        let r = circle.radius_px(image);
        let t = circle.total_px(image);
        Self {
            center: circle.center_px(image),
            radius2: r * r,
            total2: t * t,
        }
    }

    /// 1 inside the radius, `f^2` across the border band, 0 beyond it.
    ///
    /// With no border `total2 == radius2` and the band is empty.
    #[inline]
    pub(crate) fn opacity(&self, p: Point) -> f32 {
        let d2 = (p - self.center).hypot2();
        if d2 < self.radius2 {
            1.0
        } else if d2 < self.total2 {
            let f = (self.total2 - d2) / (self.total2 - self.radius2);
            (f * f) as f32
        } else {
            0.0
        }
    }
}

/// Sample count keeping every outline segment shorter than one pixel.
pub(crate) fn outline_len(radius_px: f64) -> usize {
    let n = (TAU * radius_px).ceil();
    if n.is_finite() && n > 0.0 {
        (n as usize).saturating_add(1).max(MIN_OUTLINE_POINTS)
    } else {
        MIN_OUTLINE_POINTS
    }
}

/// Evenly spaced points on the circle of `radius_px` around `center`, undistorted.
pub(crate) fn sample_outline(center: Point, radius_px: f64) -> BlendResult<Vec<Point>> {
    let n = outline_len(radius_px);
    let mut points = try_points(n, "circle outline")?;
    for (k, p) in points.iter_mut().enumerate() {
        let angle = TAU * k as f64 / n as f64;
        *p = center + Vec2::from_angle(angle) * radius_px;
    }
    Ok(points)
}

#[cfg(test)]
#[path = "../../tests/unit/masks/circle.rs"]
mod tests;
