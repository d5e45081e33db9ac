//! S3TC (DDS) container parsing
//!
//! Only the FourCC-compressed DXT1/DXT3/DXT5 layouts are handled; DDS
//! files carrying uncompressed or DX10-extended payloads are rejected.

use crate::capabilities::DeviceCapabilities;
use crate::detect::ContainerFormat;
use crate::error::{Result, TextureError};
use crate::image::{DecodedImage, Mipmap, MipmapChain};
use crate::mipmap::{self, MAX_MIPMAPS};
use crate::pixel_format::PixelFormat;
use crate::reader::HeaderReader;
use crate::software::{self, S3tcVariant};

// 4-byte magic plus the 124-byte DDS_HEADER struct
const DDS_HEADER_SIZE: usize = 128;

const fn four_cc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    u32::from_le_bytes([a, b, c, d])
}

const FOUR_CC_DXT1: u32 = four_cc(b'D', b'X', b'T', b'1');
const FOUR_CC_DXT3: u32 = four_cc(b'D', b'X', b'T', b'3');
const FOUR_CC_DXT5: u32 = four_cc(b'D', b'X', b'T', b'5');

/// Parse a DDS file into either compressed slices for the hardware
/// decoder or one software-decompressed RGBA8888 surface
pub fn parse(data: &[u8], caps: &DeviceCapabilities) -> Result<DecodedImage> {
    let mut reader = HeaderReader::new(data);
    let magic = reader.read_bytes(4)?;
    if &magic[..3] != b"DDS" {
        return Err(TextureError::malformed("DDS", "missing DDS magic"));
    }
    let _struct_size = reader.read_u32_le()?;
    let _header_flags = reader.read_u32_le()?;
    let height = reader.read_u32_le()?;
    let width = reader.read_u32_le()?;
    let _pitch_or_linear_size = reader.read_u32_le()?;
    let _depth = reader.read_u32_le()?;
    let mip_count = reader.read_u32_le()?;
    // dwReserved1[11]
    reader.skip(44)?;
    let _pixel_format_size = reader.read_u32_le()?;
    let _pixel_format_flags = reader.read_u32_le()?;
    let pixel_four_cc = reader.read_u32_le()?;
    // rest of the pixel format struct, surface caps, dwReserved2
    reader.skip(DDS_HEADER_SIZE - reader.position())?;

    if width == 0 || height == 0 {
        return Err(TextureError::malformed("DDS", "zero texture extent"));
    }

    let (native, variant, block_size) = match pixel_four_cc {
        FOUR_CC_DXT1 => (PixelFormat::S3tcDxt1, S3tcVariant::Dxt1, 8),
        FOUR_CC_DXT3 => (PixelFormat::S3tcDxt3, S3tcVariant::Dxt3, 16),
        FOUR_CC_DXT5 => (PixelFormat::S3tcDxt5, S3tcVariant::Dxt5, 16),
        other => {
            return Err(TextureError::unsupported_format(format!(
                "DDS FourCC {:?}",
                String::from_utf8_lossy(&other.to_le_bytes())
            )))
        }
    };

    // A count of 0 means a single unmipped surface
    let mips = mip_count.max(1);
    if mips as usize > MAX_MIPMAPS {
        return Err(TextureError::MipBudgetExceeded {
            count: mips,
            limit: MAX_MIPMAPS as u32,
        });
    }

    let payload = &data[DDS_HEADER_SIZE..];
    if payload.is_empty() {
        return Err(TextureError::malformed("DDS", "missing pixel data"));
    }

    if caps.s3tc {
        let chain = hardware_chain(payload, width, height, mips, block_size);
        Ok(DecodedImage::new(
            width,
            height,
            ContainerFormat::S3tc,
            native,
            false,
            chain,
        ))
    } else {
        tracing::warn!(?variant, "no hardware S3TC decoder, decompressing in software");
        let chain = software_chain(payload, width, height, mips, block_size, variant)?;
        Ok(DecodedImage::new(
            width,
            height,
            ContainerFormat::S3tc,
            PixelFormat::Rgba8888,
            false,
            chain,
        ))
    }
}

fn hardware_chain(
    payload: &[u8],
    width: u32,
    height: u32,
    mips: u32,
    block_size: u32,
) -> MipmapChain {
    let mut slices = Vec::new();
    let (mut width, mut height) = (width, height);
    let mut offset = 0usize;
    for _ in 0..mips {
        if width == 0 && height == 0 {
            break;
        }
        let size = mipmap::block4_level_size(width.max(1), height.max(1), block_size);
        let len = size.min(payload.len().saturating_sub(offset));
        slices.push(Mipmap { offset, len });
        offset += size;
        width >>= 1;
        height >>= 1;
    }
    MipmapChain::Packed {
        data: payload.to_vec(),
        slices,
    }
}

/// Decompress the whole chain into one RGBA8888 buffer sized up front,
/// levels laid out back to back in chain order
fn software_chain(
    payload: &[u8],
    width: u32,
    height: u32,
    mips: u32,
    block_size: u32,
    variant: S3tcVariant,
) -> Result<MipmapChain> {
    let total = mipmap::decoded_chain_size("DDS", width, height, mips as usize)?;
    let mut decoded = mipmap::alloc_output(total)?;
    let mut slices = Vec::new();
    let (mut width, mut height) = (width, height);
    let mut encode_offset = 0usize;
    let mut decode_offset = 0usize;
    for _ in 0..mips {
        if width == 0 && height == 0 {
            break;
        }
        let (level_width, level_height) = (width.max(1), height.max(1));
        let source = payload.get(encode_offset..).unwrap_or(&[]);
        let rgba = software::decode_s3tc(source, level_width, level_height, variant)?;
        decoded[decode_offset..decode_offset + rgba.len()].copy_from_slice(&rgba);
        slices.push(Mipmap {
            offset: decode_offset,
            len: rgba.len(),
        });
        decode_offset += rgba.len();
        encode_offset += mipmap::block4_level_size(level_width, level_height, block_size);
        width >>= 1;
        height >>= 1;
    }
    Ok(MipmapChain::Packed {
        data: decoded,
        slices,
    })
}
