//! Error types for edgematch.

use thiserror::Error;

/// Result alias for edgematch operations.
pub type EdgeMatchResult<T> = std::result::Result<T, EdgeMatchError>;

/// Errors that can occur when training or searching.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EdgeMatchError {
    /// Image or buffer dimensions are zero or inconsistent.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region of interest does not fit inside the image.
    #[error("roi {width}x{height} at ({x}, {y}) exceeds image {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// An index into a per-level or per-variant table is out of range.
    #[error("{context} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// Training or search parameters are invalid.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Decoding or encoding an image file failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
    /// The search was cancelled between pyramid levels.
    #[error("search cancelled")]
    Cancelled,
}
