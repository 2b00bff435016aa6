//! Rasterization error types
//!
//! One variant per caller-visible failure kind. Every variant carries the
//! minimal identifying payload (field name, locator, page index) plus a
//! human-readable detail, so a transport layer can marshal errors as
//! structured (kind, detail) pairs without string matching.

use thiserror::Error;

/// Caller-visible rasterization error
#[derive(Debug, Error)]
pub enum RasterError {
    /// A required argument is missing or outside its documented domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The byte source is unreadable or not a well-formed PDF container
    #[error("failed to open document {locator}: {reason}")]
    DocumentOpenFailed { locator: String, reason: String },

    /// Page index out of range or page object corrupt
    #[error("page not found: index {0}")]
    PageOpenFailed(usize),

    /// The page's content stream could not be interpreted
    #[error("failed to render page {index}: {reason}")]
    RenderFailed { index: usize, reason: String },

    /// Bitmap serialization failure
    #[error("failed to encode bitmap: {0}")]
    EncodeFailed(String),
}

impl RasterError {
    /// Stable kind name for transport marshaling
    pub fn kind(&self) -> &'static str {
        match self {
            RasterError::InvalidArgument(_) => "InvalidArgument",
            RasterError::DocumentOpenFailed { .. } => "DocumentOpenFailed",
            RasterError::PageOpenFailed(_) => "PageOpenFailed",
            RasterError::RenderFailed { .. } => "RenderFailed",
            RasterError::EncodeFailed(_) => "EncodeFailed",
        }
    }
}

/// Result type alias for rasterization operations
pub type RasterResult<T> = std::result::Result<T, RasterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_stable() {
        let err = RasterError::InvalidArgument("width".into());
        assert_eq!(err.kind(), "InvalidArgument");

        let err = RasterError::DocumentOpenFailed {
            locator: "/tmp/x.pdf".into(),
            reason: "no such file".into(),
        };
        assert_eq!(err.kind(), "DocumentOpenFailed");

        let err = RasterError::PageOpenFailed(7);
        assert_eq!(err.kind(), "PageOpenFailed");
    }

    #[test]
    fn test_display_includes_payload() {
        let err = RasterError::PageOpenFailed(3);
        assert_eq!(err.to_string(), "page not found: index 3");

        let err = RasterError::RenderFailed {
            index: 0,
            reason: "bad operand".into(),
        };
        assert!(err.to_string().contains("page 0"));
        assert!(err.to_string().contains("bad operand"));
    }
}
