//! Mask shapes and their rasterization into opacity buffers.
//!
//! A shape lives in normalized, undistorted image coordinates. Rasterizing it over a
//! pipeline-space [`Roi`](crate::Roi) maps sample positions back through the
//! [`CoordinateTransform`](crate::CoordinateTransform) and evaluates the analytic falloff
//! there.

mod circle;
mod feather;
mod raster;
mod shape;

pub use circle::Circle;
pub use feather::feather;
pub use shape::{MaskContext, Shape, rasterize};
