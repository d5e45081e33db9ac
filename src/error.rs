//! Error types for texture container decoding

use thiserror::Error;

use crate::detect::ContainerFormat;

/// Result type for texture container operations
pub type Result<T> = std::result::Result<T, TextureError>;

/// Errors that can occur while decoding a texture container
///
/// All failures are local to a single decode call and non-retryable:
/// a caller may re-attempt with a re-encoded asset, but the crate never
/// retries internally and never returns a partial image.
#[derive(Error, Debug)]
pub enum TextureError {
    /// Header signature, size or field validation failed
    #[error("malformed {container} header: {reason}")]
    MalformedHeader {
        container: &'static str,
        reason: String,
    },

    /// Pixel format tag is absent from the lookup table or rejected by
    /// the device compatibility predicate
    #[error("unsupported pixel format {format}: re-encode it with a supported variant")]
    UnsupportedPixelFormat { format: String },

    /// The file requires a device capability that is absent
    #[error("device capability missing: {0}")]
    CapabilityMismatch(String),

    /// Declared mipmap count exceeds the configured ceiling
    #[error("mipmap count {count} exceeds the maximum chain length of {limit}")]
    MipBudgetExceeded { count: u32, limit: u32 },

    /// Buffer is shorter than the structure being read from it
    #[error("not enough data: expected {expected} bytes, got {actual}")]
    NotEnoughData { expected: usize, actual: usize },

    /// An output buffer could not be allocated
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailure { bytes: usize },

    /// The external block decompressor reported an error
    #[error("software decode failed: {0}")]
    SoftwareDecodeFailure(String),

    /// A recognized container that is handled by an external codec
    /// (PNG, JPEG, TIFF, WEBP)
    #[error("{0:?} containers are decoded by an external codec")]
    UnsupportedContainer(ContainerFormat),

    /// No signature matched; the caller may fall back to the TGA reader
    #[error("unrecognized container format")]
    UnknownContainer,
}

impl TextureError {
    /// Create a new malformed header error
    pub fn malformed<S: Into<String>>(container: &'static str, reason: S) -> Self {
        Self::MalformedHeader {
            container,
            reason: reason.into(),
        }
    }

    /// Create a new unsupported pixel format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedPixelFormat {
            format: format.into(),
        }
    }

    /// Create a new capability mismatch error
    pub fn capability<S: Into<String>>(msg: S) -> Self {
        Self::CapabilityMismatch(msg.into())
    }

    /// Create a new not enough data error
    pub fn not_enough_data(expected: usize, actual: usize) -> Self {
        Self::NotEnoughData { expected, actual }
    }

    /// Create a new software decode failure
    pub fn software_decode<S: Into<String>>(msg: S) -> Self {
        Self::SoftwareDecodeFailure(msg.into())
    }
}
