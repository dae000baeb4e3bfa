//! End-to-end blend driver: mask assembly followed by compositing.

mod pipeline;

pub use pipeline::{BlendRequest, blend_process, build_mask};
