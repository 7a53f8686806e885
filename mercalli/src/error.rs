//! Error types for the crate.

use thiserror::Error;

/// Error that can be returned by the engine.
#[derive(Debug, Error)]
pub enum MercalliError {
    /// Failed to load data from an external source.
    #[error("failed to load data")]
    Io,
    /// Requested item is not present.
    #[error("item not found")]
    NotFound,
    /// Failed to decode an image.
    #[error("failed to decode image")]
    ImageDecode(#[from] image::ImageError),
    /// File system operation failed.
    #[error("file system error: {0}")]
    FsIo(#[from] std::io::Error),
    /// Any other error.
    #[error("{0}")]
    Generic(String),
}

impl From<reqwest::Error> for MercalliError {
    fn from(_: reqwest::Error) -> Self {
        MercalliError::Io
    }
}
