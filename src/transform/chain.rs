use crate::foundation::core::Point;
use crate::foundation::error::BlendResult;
use crate::transform::{AffineOp, CoordinateTransform, LensOp, PriorityRange};

/// Geometry of one operator in a [`DistortionChain`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistortKind {
    Affine(AffineOp),
    Lens(LensOp),
}

impl DistortKind {
    fn forward(&self, p: Point) -> BlendResult<Point> {
        match self {
            Self::Affine(op) => Ok(op.forward(p)),
            Self::Lens(op) => op.forward(p),
        }
    }

    fn backward(&self, p: Point) -> BlendResult<Point> {
        match self {
            Self::Affine(op) => Ok(op.backward(p)),
            Self::Lens(op) => op.backward(p),
        }
    }
}

/// Operator placed at a pipeline priority.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistortOp {
    pub priority: i32,
    pub kind: DistortKind,
}

/// Ordered list of geometric operators, applied by ascending priority.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistortionChain {
    ops: Vec<DistortOp>,
}

impl DistortionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an operator, keeping insertion order among equal priorities.
    pub fn push(&mut self, priority: i32, kind: DistortKind) -> &mut Self {
        let at = self.ops.partition_point(|op| op.priority <= priority);
        self.ops.insert(at, DistortOp { priority, kind });
        self
    }

    pub fn with(mut self, priority: i32, kind: DistortKind) -> Self {
        self.push(priority, kind);
        self
    }

    pub fn ops(&self) -> &[DistortOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl CoordinateTransform for DistortionChain {
    fn forward(&self, points: &mut [Point], range: PriorityRange) -> BlendResult<()> {
        for op in self.ops.iter().filter(|op| range.contains(op.priority)) {
            for p in points.iter_mut() {
                *p = op.kind.forward(*p)?;
            }
        }
        Ok(())
    }

    fn backward(&self, points: &mut [Point], range: PriorityRange) -> BlendResult<()> {
        for op in self.ops.iter().rev().filter(|op| range.contains(op.priority)) {
            for p in points.iter_mut() {
                *p = op.kind.backward(*p)?;
            }
        }
        Ok(())
    }
}
