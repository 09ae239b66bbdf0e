//! Upload errors

use std::io;
use thiserror::Error;

/// Errors raised while parsing a multipart body
#[derive(Debug, Error)]
pub enum UploadError {
    /// Reading the request body (or writing a spooled part) failed
    #[error("upload stream failed: {0}")]
    Io(#[from] io::Error),

    /// Content-Type carries no usable `boundary` parameter
    #[error("no multipart boundary in content type `{0}`")]
    MissingBoundary(String),

    /// The body does not start with the opening boundary
    #[error("opening boundary `{0}` not found in stream")]
    MissingOpeningBoundary(String),

    /// The body breaks the multipart framing
    #[error("invalid multipart format: {0}")]
    InvalidFormat(String),

    /// A part header block never terminated within the limit
    #[error("part header exceeds {max} bytes")]
    HeaderTooLarge { max: usize },

    /// A file part is larger than allowed
    #[error("file field `{name}` exceeds {max} bytes")]
    FileTooLarge { name: String, max: u64 },

    /// The temp file pool could not provide a file
    #[error("failed to create temp file: {0}")]
    TempFile(#[source] io::Error),
}

impl UploadError {
    /// Check if the error comes from malformed input rather than I/O
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            UploadError::MissingBoundary(_)
                | UploadError::MissingOpeningBoundary(_)
                | UploadError::InvalidFormat(_)
                | UploadError::HeaderTooLarge { .. }
        )
    }
}
