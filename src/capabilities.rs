//! Device capability bits consulted during format negotiation

/// Capability bits of the rendering device.
///
/// These mirror the boolean queries a graphics backend exposes for the
/// formats this crate can hand it. Capture them once at startup and pass
/// the same value to every decode call; the decoder only reads them, so
/// concurrent decodes on separate buffers stay race-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    /// Hardware PVRTC (2/4 bpp) decoding
    pub pvrtc: bool,
    /// Hardware ETC1 decoding
    pub etc1: bool,
    /// Hardware S3TC (DXT1/3/5) decoding
    pub s3tc: bool,
    /// Hardware ATITC (ATC) decoding
    pub atitc: bool,
    /// BGRA8888 texture uploads
    pub bgra8888: bool,
    /// Non-power-of-two texture dimensions
    pub npot: bool,
}

impl DeviceCapabilities {
    /// A device supporting every format (no software fallback taken)
    pub fn all() -> Self {
        Self {
            pvrtc: true,
            etc1: true,
            s3tc: true,
            atitc: true,
            bgra8888: true,
            npot: true,
        }
    }

    /// A device supporting none of the optional formats
    pub fn none() -> Self {
        Self::default()
    }
}

/// True if `n` is a power of two. Zero is not a valid texture extent and
/// reports false.
pub(crate) fn is_power_of_two(n: u32) -> bool {
    n != 0 && n & (n - 1) == 0
}
