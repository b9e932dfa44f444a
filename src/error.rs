//! Unified error type for alpha-channel operations.

use alloc::string::String;

use crate::buffer::ChannelLayout;

/// Result alias used throughout the crate.
pub type Result<T, E = AlphaError> = core::result::Result<T, E>;

/// Unified error type for alpha-channel operations.
///
/// Every operation is a pure function of its inputs, so an error recurs
/// identically on retry. No operation leaves partial output behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AlphaError {
    /// Coordinate access beyond the buffer dimensions. Indicates a caller bug.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    /// The operation needs a channel layout the input does not have.
    #[error("{operation} does not support {layout:?} input")]
    UnsupportedLayout {
        operation: &'static str,
        layout: ChannelLayout,
    },

    /// Two buffers that must correspond pixel-for-pixel differ in size.
    #[error("dimension mismatch: expected {expected:?} (width, height), got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// A generation rule with an out-of-range or malformed parameter.
    #[error("invalid generation rule: {0}")]
    InvalidRule(String),

    /// Sample data that does not describe a valid buffer.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
}

impl AlphaError {
    pub(crate) fn unsupported(operation: &'static str, layout: ChannelLayout) -> Self {
        AlphaError::UnsupportedLayout { operation, layout }
    }
}
