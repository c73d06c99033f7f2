use thiserror::Error;

use crate::pixels::PixelKind;

/// Errors surfaced by volumes, the slice codec and the virtual stack.
#[derive(Debug, Error)]
pub enum StackError {
    /// A slice index (or coordinate component) outside the addressable range
    #[error("Slice index {index} out of range: stack has {len} slices")]
    OutOfRange { index: i64, len: usize },

    /// Scatter source and target element counts disagree
    #[error("Length mismatch: plane has {expected} elements, buffer has {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Buffer storage kind is not one of u8, u16 or f32
    #[error("Unsupported pixel kind: {0:?}")]
    UnsupportedPixelKind(PixelKind),

    /// A slice stack needs at least two plane dimensions
    #[error("Volume has {0} dimensions, need at least 2")]
    TooFewDimensions(usize),

    #[error("Volume has {0} dimensions, at most {max} are supported", max = crate::volume::MAX_DIMENSIONS)]
    TooManyDimensions(usize),

    /// Shape and data length of a volume constructor disagree
    #[error("Invalid shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid render config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported TIFF layout: {0}")]
    UnsupportedTiff(String),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),
}

pub type Result<T> = std::result::Result<T, StackError>;
