//! Error types for the built-in stages
//!
//! Stage actions return [`morph_core::Result`]; these errors reach the caller
//! wrapped in [`morph_core::Error::Action`] and can be recovered with
//! `downcast_ref::<morph_stages::Error>()` on the boxed source.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for stage helpers
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the built-in stages
#[derive(Debug, Error)]
pub enum Error {
    /// Writing an output file failed
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Pixel or sample buffer does not match the declared dimensions
    #[error("{width}x{height} image needs {} samples, got {actual}", width.saturating_mul(*height))]
    InvalidImage {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Buffer length
        actual: usize,
    },

    /// Dimensions the encoder cannot represent
    #[error("unsupported image dimensions {width}x{height}")]
    UnsupportedDimensions {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },

    /// zlib compression of the image data failed
    #[error("image compression failed: {0}")]
    Compress(#[source] io::Error),
}

impl From<Error> for morph_core::Error {
    fn from(err: Error) -> Self {
        morph_core::Error::action(err)
    }
}
