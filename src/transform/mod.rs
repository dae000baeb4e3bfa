//! Coordinate mapping between image space and distorted pipeline space.
//!
//! Shapes are defined in undistorted image space. Pixel work happens in pipeline space, after
//! every geometric operator (crop, rotation, lens correction, ...) that precedes the consuming
//! module. [`CoordinateTransform`] is the seam the host pipeline implements; [`DistortionChain`]
//! is a self-contained implementation used by the CLI and tests.

mod affine;
mod chain;
mod non_linear;

use rayon::prelude::*;

use crate::foundation::core::Point;
use crate::foundation::error::BlendResult;

pub use affine::AffineOp;
pub use chain::{DistortKind, DistortOp, DistortionChain};
pub use non_linear::LensOp;

/// Points per work item when a large point set is transformed in parallel.
pub(crate) const TRANSFORM_CHUNK: usize = 4096;

/// Half-open range of operator priorities `[min, max)` a transform call is restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PriorityRange {
    pub min: i32,
    pub max: i32,
}

impl PriorityRange {
    /// Every operator in the chain.
    pub const ALL: Self = Self {
        min: i32::MIN,
        max: i32::MAX,
    };

    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Operators that run before a module sitting at `priority`.
    pub fn before(priority: i32) -> Self {
        Self {
            min: i32::MIN,
            max: priority,
        }
    }

    pub fn contains(self, priority: i32) -> bool {
        self.min <= priority && priority < self.max
    }
}

impl Default for PriorityRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// Bidirectional point mapper between image space and pipeline space.
///
/// Implementations must be pure and re-entrant: the rasterizer may call them concurrently on
/// disjoint point slices. On error the slice content is unspecified and callers discard it.
pub trait CoordinateTransform: Sync {
    /// Image space to pipeline space, in place.
    fn forward(&self, points: &mut [Point], range: PriorityRange) -> BlendResult<()>;

    /// Pipeline space to image space, in place.
    fn backward(&self, points: &mut [Point], range: PriorityRange) -> BlendResult<()>;
}

/// Transform that leaves every point where it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl CoordinateTransform for Identity {
    fn forward(&self, _points: &mut [Point], _range: PriorityRange) -> BlendResult<()> {
        Ok(())
    }

    fn backward(&self, _points: &mut [Point], _range: PriorityRange) -> BlendResult<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

/// Map `points` through `transform`, splitting large sets across rayon workers.
pub(crate) fn map_points(
    transform: &dyn CoordinateTransform,
    points: &mut [Point],
    range: PriorityRange,
    direction: Direction,
    parallel: bool,
) -> BlendResult<()> {
    let run = |chunk: &mut [Point]| match direction {
        Direction::Forward => transform.forward(chunk, range),
        Direction::Backward => transform.backward(chunk, range),
    };
    if !parallel || points.len() <= TRANSFORM_CHUNK {
        return run(points);
    }
    points.par_chunks_mut(TRANSFORM_CHUNK).try_for_each(run)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/mod.rs"]
mod tests;
