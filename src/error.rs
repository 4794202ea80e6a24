//! Comparison Error Types
//!
//! Both error kinds are unrecoverable at the point of detection: a failed
//! run aborts with no partial result.

use thiserror::Error;

/// Result type for comparison operations
pub type Result<T> = std::result::Result<T, DiffError>;

/// Comparison toolkit error types
#[derive(Error, Debug)]
pub enum DiffError {
    /// Input or output file could not be accessed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes are not a supported raster format
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Output image could not be encoded or written
    #[error("Image encode error: {0}")]
    Encode(String),

    /// Crop rectangle is empty or falls outside the image
    #[error("Invalid crop region: {0}")]
    InvalidCropRegion(String),

    /// JSON report could not be serialized
    #[error("Report serialization error: {0}")]
    Report(String),
}
