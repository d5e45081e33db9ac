//! PVR container parsing, legacy v2 and current v3 headers
//!
//! Both versions share a 52-byte fixed header followed by the mipmap
//! chain packed largest level first. v2 identifies itself with a `PVR!`
//! tag near the end of the header; v3 opens with a big-endian version
//! magic and may interpose a metadata block before the pixel data.

use crate::capabilities::{is_power_of_two, DeviceCapabilities};
use crate::container::DecodeOptions;
use crate::detect::ContainerFormat;
use crate::error::{Result, TextureError};
use crate::image::{DecodedImage, Mipmap, MipmapChain};
use crate::mipmap::{self, MAX_MIPMAPS};
use crate::pixel_format::PixelFormat;
use crate::reader::HeaderReader;
use crate::software;

const PVR2_HEADER_SIZE: usize = 52;
// "PVR!" read little-endian
const PVR2_TAG: u32 = 0x2152_5650;
// 'P' 'V' 'R' 3 read big-endian
const PVR3_VERSION: u32 = 0x5056_5203;

const PVR2_FLAG_VERTICAL_FLIP: u32 = 1 << 16;
const PVR3_FLAG_PREMULTIPLIED: u32 = 1 << 1;

/// True if the buffer carries either PVR header variant
pub(crate) fn is_pvr(data: &[u8]) -> bool {
    if data.len() < PVR2_HEADER_SIZE {
        return false;
    }
    &data[44..48] == b"PVR!"
        || u32::from_be_bytes([data[0], data[1], data[2], data[3]]) == PVR3_VERSION
}

/// Native pixel format tags of the PVR v2 header (low byte of `flags`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pvr2PixelFormat {
    Rgba4444,
    Rgba5551,
    Rgba8888,
    Rgb565,
    Rgb555,
    Rgb888,
    I8,
    Ai88,
    Pvrtc2BppRgba,
    Pvrtc4BppRgba,
    Bgra8888,
    A8,
}

impl Pvr2PixelFormat {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x10 => Some(Self::Rgba4444),
            0x11 => Some(Self::Rgba5551),
            0x12 => Some(Self::Rgba8888),
            0x13 => Some(Self::Rgb565),
            0x14 => Some(Self::Rgb555),
            0x15 => Some(Self::Rgb888),
            0x16 => Some(Self::I8),
            0x17 => Some(Self::Ai88),
            0x18 => Some(Self::Pvrtc2BppRgba),
            0x19 => Some(Self::Pvrtc4BppRgba),
            0x1A => Some(Self::Bgra8888),
            0x1B => Some(Self::A8),
            _ => None,
        }
    }

    /// The device pixel format this tag decodes to. RGB555 has no
    /// device-side equivalent and is rejected.
    fn device_pixel_format(self) -> Option<PixelFormat> {
        match self {
            Self::Rgba4444 => Some(PixelFormat::Rgba4444),
            Self::Rgba5551 => Some(PixelFormat::Rgb5A1),
            Self::Rgba8888 => Some(PixelFormat::Rgba8888),
            Self::Rgb565 => Some(PixelFormat::Rgb565),
            Self::Rgb555 => None,
            Self::Rgb888 => Some(PixelFormat::Rgb888),
            Self::I8 => Some(PixelFormat::I8),
            Self::Ai88 => Some(PixelFormat::Ai88),
            Self::Pvrtc2BppRgba => Some(PixelFormat::Pvrtc2A),
            Self::Pvrtc4BppRgba => Some(PixelFormat::Pvrtc4A),
            Self::Bgra8888 => Some(PixelFormat::Bgra8888),
            Self::A8 => Some(PixelFormat::A8),
        }
    }
}

/// Native pixel format tags of the PVR v3 header (u64 field).
///
/// Only the tags with a decode path are represented; any other tag value
/// fails the lookup and the file is rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pvr3PixelFormat {
    Pvrtc2BppRgb,
    Pvrtc2BppRgba,
    Pvrtc4BppRgb,
    Pvrtc4BppRgba,
    Etc1,
    Dxt1,
    Dxt3,
    Dxt5,
    Bgra8888,
    Rgba8888,
    Rgba4444,
    Rgba5551,
    Rgb565,
    Rgb888,
    A8,
    L8,
    La88,
}

impl Pvr3PixelFormat {
    fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(Self::Pvrtc2BppRgb),
            1 => Some(Self::Pvrtc2BppRgba),
            2 => Some(Self::Pvrtc4BppRgb),
            3 => Some(Self::Pvrtc4BppRgba),
            6 => Some(Self::Etc1),
            7 => Some(Self::Dxt1),
            9 => Some(Self::Dxt3),
            11 => Some(Self::Dxt5),
            0x0808_0808_6172_6762 => Some(Self::Bgra8888),
            0x0808_0808_6162_6772 => Some(Self::Rgba8888),
            0x0404_0404_6162_6772 => Some(Self::Rgba4444),
            0x0105_0505_6162_6772 => Some(Self::Rgba5551),
            0x0005_0605_0062_6772 => Some(Self::Rgb565),
            0x0008_0808_0062_6772 => Some(Self::Rgb888),
            0x0000_0008_0000_0061 => Some(Self::A8),
            0x0000_0008_0000_006c => Some(Self::L8),
            0x0000_0808_0000_616c => Some(Self::La88),
            _ => None,
        }
    }

    /// Reject tags whose only decode path needs an absent device
    /// capability. PVRTC and ETC1 always pass: they fall back to the
    /// software decompressor.
    fn check_device_support(self, caps: &DeviceCapabilities) -> Result<()> {
        match self {
            Self::Dxt1 | Self::Dxt3 | Self::Dxt5 if !caps.s3tc => Err(TextureError::capability(
                "hardware S3TC decoder required for DXT data inside PVR v3",
            )),
            Self::Bgra8888 if !caps.bgra8888 => Err(TextureError::capability(
                "BGRA8888 textures are not supported by this device",
            )),
            _ => Ok(()),
        }
    }

    fn device_pixel_format(self) -> PixelFormat {
        match self {
            Self::Pvrtc2BppRgb => PixelFormat::Pvrtc2,
            Self::Pvrtc2BppRgba => PixelFormat::Pvrtc2A,
            Self::Pvrtc4BppRgb => PixelFormat::Pvrtc4,
            Self::Pvrtc4BppRgba => PixelFormat::Pvrtc4A,
            Self::Etc1 => PixelFormat::Etc,
            Self::Dxt1 => PixelFormat::S3tcDxt1,
            Self::Dxt3 => PixelFormat::S3tcDxt3,
            Self::Dxt5 => PixelFormat::S3tcDxt5,
            Self::Bgra8888 => PixelFormat::Bgra8888,
            Self::Rgba8888 => PixelFormat::Rgba8888,
            Self::Rgba4444 => PixelFormat::Rgba4444,
            Self::Rgba5551 => PixelFormat::Rgb5A1,
            Self::Rgb565 => PixelFormat::Rgb565,
            Self::Rgb888 => PixelFormat::Rgb888,
            Self::A8 => PixelFormat::A8,
            Self::L8 => PixelFormat::I8,
            Self::La88 => PixelFormat::Ai88,
        }
    }
}

/// Parse a PVR file of either header version
pub fn parse(
    data: &[u8],
    caps: &DeviceCapabilities,
    options: &DecodeOptions,
) -> Result<DecodedImage> {
    if data.len() >= 4
        && u32::from_be_bytes([data[0], data[1], data[2], data[3]]) == PVR3_VERSION
    {
        parse_v3(data, caps)
    } else {
        parse_v2(data, caps, options)
    }
}

fn parse_v2(
    data: &[u8],
    caps: &DeviceCapabilities,
    options: &DecodeOptions,
) -> Result<DecodedImage> {
    let mut reader = HeaderReader::new(data);
    let _header_length = reader.read_u32_le()?;
    let height = reader.read_u32_le()?;
    let width = reader.read_u32_le()?;
    let num_mipmaps = reader.read_u32_le()?;
    let flags = reader.read_u32_le()?;
    let data_length = reader.read_u32_le()?;
    let _bpp = reader.read_u32_le()?;
    let _bitmask_r = reader.read_u32_le()?;
    let _bitmask_g = reader.read_u32_le()?;
    let _bitmask_b = reader.read_u32_le()?;
    let _bitmask_a = reader.read_u32_le()?;
    let pvr_tag = reader.read_u32_le()?;
    let _num_surfaces = reader.read_u32_le()?;

    if pvr_tag != PVR2_TAG {
        return Err(TextureError::malformed("PVRv2", "missing PVR! tag"));
    }
    if width == 0 || height == 0 {
        return Err(TextureError::malformed("PVRv2", "zero texture extent"));
    }

    let tag = (flags & 0xFF) as u8;
    let native = Pvr2PixelFormat::from_tag(tag)
        .and_then(Pvr2PixelFormat::device_pixel_format)
        .ok_or_else(|| {
            TextureError::unsupported_format(format!("PVRv2 pixel format tag 0x{tag:02x}"))
        })?;

    if flags & PVR2_FLAG_VERTICAL_FLIP != 0 {
        tracing::warn!("PVR v2 image is vertically flipped, pixel rows are in mirrored order");
    }
    if native == PixelFormat::Bgra8888 && !caps.bgra8888 {
        return Err(TextureError::capability(
            "BGRA8888 textures are not supported by this device",
        ));
    }
    if !caps.npot && (!is_power_of_two(width) || !is_power_of_two(height)) {
        return Err(TextureError::capability(format!(
            "non-power-of-two texture {width}x{height} on a power-of-two-only device"
        )));
    }

    let declared_levels = num_mipmaps.saturating_add(1);
    if declared_levels as usize > MAX_MIPMAPS {
        return Err(TextureError::MipBudgetExceeded {
            count: declared_levels,
            limit: MAX_MIPMAPS as u32,
        });
    }

    let payload = &data[PVR2_HEADER_SIZE..];
    let data_length = (data_length as usize).min(payload.len());
    let render_format = native.device_format(caps);
    let chain = walk_chain(
        "PVRv2",
        payload,
        data_length,
        width,
        height,
        MAX_MIPMAPS,
        native,
        render_format,
    )?;

    Ok(DecodedImage::new(
        width,
        height,
        ContainerFormat::Pvr,
        render_format,
        options.pvr2_premultiplied(),
        chain,
    ))
}

fn parse_v3(data: &[u8], caps: &DeviceCapabilities) -> Result<DecodedImage> {
    let mut reader = HeaderReader::new(data);
    let version = reader.read_u32_be()?;
    if version != PVR3_VERSION {
        return Err(TextureError::malformed("PVRv3", "bad version magic"));
    }
    let flags = reader.read_u32_le()?;
    let tag = reader.read_u64_le()?;
    let _color_space = reader.read_u32_le()?;
    let _channel_type = reader.read_u32_le()?;
    let height = reader.read_u32_le()?;
    let width = reader.read_u32_le()?;
    let _depth = reader.read_u32_le()?;
    let _num_surfaces = reader.read_u32_le()?;
    let _num_faces = reader.read_u32_le()?;
    let num_mipmaps = reader.read_u32_le()?;
    let metadata_length = reader.read_u32_le()?;

    if width == 0 || height == 0 {
        return Err(TextureError::malformed("PVRv3", "zero texture extent"));
    }

    let native_tag = Pvr3PixelFormat::from_tag(tag).ok_or_else(|| {
        TextureError::unsupported_format(format!("PVRv3 pixel format tag 0x{tag:016x}"))
    })?;
    native_tag.check_device_support(caps)?;

    // Encoders write 0 for single-level images
    let levels = num_mipmaps.max(1);
    if levels as usize > MAX_MIPMAPS {
        return Err(TextureError::MipBudgetExceeded {
            count: levels,
            limit: MAX_MIPMAPS as u32,
        });
    }

    reader.skip(metadata_length as usize)?;
    let payload = &data[reader.position()..];
    let native = native_tag.device_pixel_format();
    let render_format = native.device_format(caps);
    let chain = walk_chain(
        "PVRv3",
        payload,
        payload.len(),
        width,
        height,
        levels as usize,
        native,
        render_format,
    )?;

    Ok(DecodedImage::new(
        width,
        height,
        ContainerFormat::Pvr,
        render_format,
        flags & PVR3_FLAG_PREMULTIPLIED != 0,
        chain,
    ))
}

/// Walk the packed mipmap chain shared by both header versions.
///
/// Hardware-consumable formats record `{offset, len}` slices into the
/// payload; formats downgraded by the capability negotiation decompress
/// each level into its own buffer as they are visited. Declared level
/// sizes are always clamped to the bytes actually remaining, so a
/// truncated file yields a short final level rather than a read past the
/// end.
#[allow(clippy::too_many_arguments)]
fn walk_chain(
    container: &'static str,
    payload: &[u8],
    data_length: usize,
    width: u32,
    height: u32,
    max_levels: usize,
    native: PixelFormat,
    render_format: PixelFormat,
) -> Result<MipmapChain> {
    let use_software = render_format != native;
    let mut slices = Vec::new();
    let mut levels: Vec<Vec<u8>> = Vec::new();
    let (mut width, mut height) = (width, height);
    let mut offset = 0usize;
    let mut count = 0usize;

    while offset < data_length && count < max_levels {
        let mut bpp = render_format.info().bits_per_pixel;
        let (block_width, block_height) = match native {
            PixelFormat::Pvrtc2 | PixelFormat::Pvrtc2A => {
                if use_software {
                    tracing::warn!(
                        level = count,
                        width,
                        height,
                        "no hardware PVRTC decoder, decompressing 2bpp level in software"
                    );
                    levels.push(software::decode_pvrtc(
                        &payload[offset..data_length],
                        width,
                        height,
                        true,
                    )?);
                    bpp = 2;
                }
                (8, 4)
            }
            PixelFormat::Pvrtc4 | PixelFormat::Pvrtc4A => {
                if use_software {
                    tracing::warn!(
                        level = count,
                        width,
                        height,
                        "no hardware PVRTC decoder, decompressing 4bpp level in software"
                    );
                    levels.push(software::decode_pvrtc(
                        &payload[offset..data_length],
                        width,
                        height,
                        false,
                    )?);
                    bpp = 4;
                }
                (4, 4)
            }
            PixelFormat::Etc => {
                if use_software {
                    tracing::warn!(
                        level = count,
                        width,
                        height,
                        "no hardware ETC1 decoder, decompressing level in software"
                    );
                    levels.push(software::decode_etc1(
                        &payload[offset..data_length],
                        width,
                        height,
                    )?);
                }
                (4, 4)
            }
            _ => (1, 1),
        };

        let size = mipmap::pvr_level_size(width, height, block_width, block_height, bpp);
        let packet = size.min(data_length - offset);
        if !use_software {
            slices.push(Mipmap {
                offset,
                len: packet,
            });
        }
        offset += packet;
        width = mipmap::half_extent(width);
        height = mipmap::half_extent(height);
        count += 1;
    }

    if offset < data_length && count >= MAX_MIPMAPS {
        return Err(TextureError::MipBudgetExceeded {
            count: count as u32 + 1,
            limit: MAX_MIPMAPS as u32,
        });
    }
    if count == 0 {
        return Err(TextureError::malformed(container, "empty texture payload"));
    }

    if use_software {
        Ok(MipmapChain::Unpacked { levels })
    } else {
        Ok(MipmapChain::Packed {
            data: payload[..data_length].to_vec(),
            slices,
        })
    }
}
