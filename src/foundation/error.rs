/// Convenience result type used across maskblend.
pub type BlendResult<T> = Result<T, BlendError>;

/// Top-level error taxonomy used by rasterization, compositing and parameter upgrades.
#[derive(thiserror::Error, Debug)]
pub enum BlendError {
    /// The distortion chain failed to map a point set.
    #[error("transform error: {0}")]
    Transform(String),

    /// A working buffer could not be allocated.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// A legacy parameter upgrade was asked for a version it does not know.
    #[error("unsupported blend parameter version: {version}")]
    UnsupportedVersion {
        /// Offending version number.
        version: u32,
    },

    /// Shape parameters outside their valid domain.
    #[error("invalid shape parameters: {0}")]
    InvalidShape(String),

    /// Invalid caller-provided data (buffer sizes, ROI, blend parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when encoding or decoding parameter records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlendError {
    /// Build a [`BlendError::Transform`] value.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`BlendError::OutOfMemory`] value.
    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Self::OutOfMemory(msg.into())
    }

    /// Build a [`BlendError::UnsupportedVersion`] value.
    pub fn unsupported_version(version: u32) -> Self {
        Self::UnsupportedVersion { version }
    }

    /// Build a [`BlendError::InvalidShape`] value.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Build a [`BlendError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BlendError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
