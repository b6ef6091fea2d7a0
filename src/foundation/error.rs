use std::fmt;

/// Convenience result type used across the compositor core.
pub type CompositorResult<T> = Result<T, CompositorError>;

/// Which buffer of a merge a bounds violation was detected on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferRole {
    /// The base/destination surface (layer 0).
    Base,
    /// The overlay layer being merged.
    Overlay,
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferRole::Base => f.write_str("base"),
            BufferRole::Overlay => f.write_str("overlay"),
        }
    }
}

/// Top-level error taxonomy used by compositor APIs.
///
/// Accelerator conditions never appear here: an unavailable or failing
/// channel degrades to the software copy inside the blit engine and is
/// only visible in the logs.
#[derive(thiserror::Error, Debug)]
pub enum CompositorError {
    /// A layer carries a buffer descriptor that failed its consistency
    /// check; the composition pass is not executed.
    #[error("invalid buffer descriptor: {0}")]
    InvalidBufferDescriptor(String),

    /// A derived pixel address falls outside a buffer's declared size.
    /// The offending merge stops at the first violation; pixels copied
    /// before it remain written.
    #[error("{buffer} buffer pixel index {index} overruns {size}-byte buffer")]
    OutOfBounds {
        /// Buffer the violating access targeted.
        buffer: BufferRole,
        /// Linear pixel-word index that failed the check; negative when a
        /// layer placement resolved to an origin before the buffer start.
        index: i64,
        /// Declared byte size of the buffer.
        size: u64,
    },

    /// The frame publisher failed to present the composed frame.
    #[error("presentation failure: {0}")]
    Presentation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompositorError {
    /// Build a [`CompositorError::InvalidBufferDescriptor`] value.
    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidBufferDescriptor(msg.into())
    }

    /// Build a [`CompositorError::Presentation`] value.
    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation(msg.into())
    }
}
