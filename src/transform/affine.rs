//! Affine distortion operator.

use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::error::{BlendError, BlendResult};

/// Invertible affine map (crop offset, scale, rotation, flip).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineOp {
    matrix: Affine,
    inverse: Affine,
}

impl AffineOp {
    pub fn new(matrix: Affine) -> BlendResult<Self> {
        let det = matrix.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return Err(BlendError::validation("affine operator must be invertible"));
        }
        Ok(Self {
            matrix,
            inverse: matrix.inverse(),
        })
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        let matrix = Affine::translate(Vec2::new(dx, dy));
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    pub fn scale(factor: f64) -> BlendResult<Self> {
        Self::new(Affine::scale(factor))
    }

    pub fn rotate_about(radians: f64, center: Point) -> Self {
        let matrix = Affine::rotate_about(radians, center);
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    #[inline]
    pub(crate) fn forward(&self, p: Point) -> Point {
        self.matrix * p
    }

    #[inline]
    pub(crate) fn backward(&self, p: Point) -> Point {
        self.inverse * p
    }
}
