//! Radial lens distortion.

use crate::foundation::core::Point;
use crate::foundation::error::{BlendError, BlendResult};

const MAX_NEWTON_STEPS: usize = 32;
const NEWTON_EPS: f64 = 1e-10;

/// Polynomial barrel/pincushion distortion around `center`.
///
/// A point at normalized radius `r = |p - center| / norm` moves to radius
/// `r * (1 + k1 r^2 + k2 r^4)`. The inverse is solved with Newton iterations and fails where
/// the polynomial folds back on itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensOp {
    center: Point,
    norm: f64,
    k1: f64,
    k2: f64,
}

impl LensOp {
    pub fn new(center: Point, norm: f64, k1: f64, k2: f64) -> BlendResult<Self> {
        if !norm.is_finite() || norm <= 0.0 {
            return Err(BlendError::validation("lens norm must be finite and > 0"));
        }
        if !k1.is_finite() || !k2.is_finite() || !center.is_finite() {
            return Err(BlendError::validation("lens coefficients must be finite"));
        }
        Ok(Self {
            center,
            norm,
            k1,
            k2,
        })
    }

    #[inline]
    fn gain(&self, r2: f64) -> f64 {
        1.0 + self.k1 * r2 + self.k2 * r2 * r2
    }

    pub(crate) fn forward(&self, p: Point) -> BlendResult<Point> {
        let d = p - self.center;
        let s = self.gain((d / self.norm).hypot2());
        if !s.is_finite() || s <= 0.0 {
            return Err(BlendError::transform(format!(
                "lens distortion folds over at ({:.2}, {:.2})",
                p.x, p.y
            )));
        }
        Ok(self.center + d * s)
    }

    pub(crate) fn backward(&self, p: Point) -> BlendResult<Point> {
        let d = p - self.center;
        let rd = (d / self.norm).hypot();
        if rd == 0.0 {
            return Ok(p);
        }

        let mut ru = rd;
        for _ in 0..MAX_NEWTON_STEPS {
            let r2 = ru * ru;
            let f = ru * self.gain(r2) - rd;
            let df = 1.0 + 3.0 * self.k1 * r2 + 5.0 * self.k2 * r2 * r2;
            if !df.is_finite() || df <= 0.0 {
                break;
            }
            let step = f / df;
            ru -= step;
            if step.abs() < NEWTON_EPS {
                return Ok(self.center + d * (ru / rd));
            }
        }

        Err(BlendError::transform(format!(
            "lens inverse did not converge at ({:.2}, {:.2})",
            p.x, p.y
        )))
    }
}
