//! Device pixel format definitions and metadata
//!
//! [`PixelFormat`] is the canonical encoding handed to the consuming
//! graphics backend, as opposed to the per-container native pixel format
//! tags declared inside PVR/DDS/KTX headers.

use serde::{Deserialize, Serialize};

use crate::capabilities::DeviceCapabilities;

/// Pixel formats the graphics backend can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 32-bit texture: RGBA8888
    Rgba8888,
    /// 32-bit texture: BGRA8888
    Bgra8888,
    /// 16-bit texture: RGBA4444
    Rgba4444,
    /// 16-bit texture: RGB5A1
    Rgb5A1,
    /// 16-bit texture without alpha: RGB565
    Rgb565,
    /// 24-bit texture: RGB888
    Rgb888,
    /// 8-bit alpha-only texture
    A8,
    /// 8-bit intensity texture
    I8,
    /// 16-bit intensity + alpha texture
    Ai88,
    /// PVRTC 2 bpp, no alpha
    Pvrtc2,
    /// PVRTC 2 bpp with alpha
    Pvrtc2A,
    /// PVRTC 4 bpp, no alpha
    Pvrtc4,
    /// PVRTC 4 bpp with alpha
    Pvrtc4A,
    /// ETC1 4 bpp
    Etc,
    /// S3TC DXT1
    S3tcDxt1,
    /// S3TC DXT3
    S3tcDxt3,
    /// S3TC DXT5
    S3tcDxt5,
    /// ATC RGB
    AtcRgb,
    /// ATC RGBA with explicit alpha
    AtcExplicitAlpha,
    /// ATC RGBA with interpolated alpha
    AtcInterpolatedAlpha,
}

/// Fixed metadata for a device pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormatInfo {
    /// Bits used to store one pixel
    pub bits_per_pixel: u32,
    /// Whether the format carries an alpha channel
    pub has_alpha: bool,
    /// Whether the format is block-compressed
    pub compressed: bool,
}

const fn info(bits_per_pixel: u32, has_alpha: bool, compressed: bool) -> PixelFormatInfo {
    PixelFormatInfo {
        bits_per_pixel,
        has_alpha,
        compressed,
    }
}

impl PixelFormat {
    /// Metadata for this format: bits per pixel, alpha, compression
    pub fn info(&self) -> PixelFormatInfo {
        match self {
            PixelFormat::Rgba8888 => info(32, true, false),
            PixelFormat::Bgra8888 => info(32, true, false),
            PixelFormat::Rgba4444 => info(16, true, false),
            PixelFormat::Rgb5A1 => info(16, true, false),
            PixelFormat::Rgb565 => info(16, false, false),
            PixelFormat::Rgb888 => info(24, false, false),
            PixelFormat::A8 => info(8, true, false),
            PixelFormat::I8 => info(8, false, false),
            PixelFormat::Ai88 => info(16, true, false),
            PixelFormat::Pvrtc2 => info(2, false, true),
            PixelFormat::Pvrtc2A => info(2, true, true),
            PixelFormat::Pvrtc4 => info(4, false, true),
            PixelFormat::Pvrtc4A => info(4, true, true),
            PixelFormat::Etc => info(4, false, true),
            PixelFormat::S3tcDxt1 => info(4, false, true),
            PixelFormat::S3tcDxt3 => info(8, true, true),
            PixelFormat::S3tcDxt5 => info(8, true, true),
            PixelFormat::AtcRgb => info(4, false, true),
            PixelFormat::AtcExplicitAlpha => info(8, true, true),
            PixelFormat::AtcInterpolatedAlpha => info(8, true, true),
        }
    }

    /// Map this format to the one the device can actually consume.
    ///
    /// Compressed formats whose hardware decoder is absent are downgraded
    /// to a safe uncompressed equivalent; everything else passes through
    /// unchanged. A downgraded result tells the container parsers to run
    /// the software block decoder instead of keeping compressed bytes.
    pub fn device_format(self, caps: &DeviceCapabilities) -> PixelFormat {
        match self {
            PixelFormat::Pvrtc2
            | PixelFormat::Pvrtc2A
            | PixelFormat::Pvrtc4
            | PixelFormat::Pvrtc4A => {
                if caps.pvrtc {
                    self
                } else {
                    PixelFormat::Rgba8888
                }
            }
            PixelFormat::Etc => {
                if caps.etc1 {
                    self
                } else {
                    PixelFormat::Rgb888
                }
            }
            _ => self,
        }
    }
}
