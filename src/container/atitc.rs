//! ATITC (ATC) container parsing from KTX files
//!
//! KTX is a generic OpenGL container; only the three ATC internal
//! formats are accepted here. Each mipmap level in the file is prefixed
//! by a 4-byte image size which is skipped, not trusted. The header's
//! endianness marker is ignored: ATC assets in the wild are
//! little-endian.

use crate::capabilities::DeviceCapabilities;
use crate::detect::ContainerFormat;
use crate::error::{Result, TextureError};
use crate::image::{DecodedImage, Mipmap, MipmapChain};
use crate::mipmap::{self, MAX_MIPMAPS};
use crate::pixel_format::PixelFormat;
use crate::reader::HeaderReader;
use crate::software::{self, AtcVariant};

const KTX_HEADER_SIZE: usize = 64;
const IMAGE_SIZE_PREFIX: usize = 4;

const GL_ATC_RGB_AMD: u32 = 0x8C92;
const GL_ATC_RGBA_EXPLICIT_ALPHA_AMD: u32 = 0x8C93;
const GL_ATC_RGBA_INTERPOLATED_ALPHA_AMD: u32 = 0x87EE;

/// Parse a KTX file holding ATC-compressed levels
pub fn parse(data: &[u8], caps: &DeviceCapabilities) -> Result<DecodedImage> {
    let mut reader = HeaderReader::new(data);
    let identifier = reader.read_bytes(12)?;
    if &identifier[1..4] != b"KTX" {
        return Err(TextureError::malformed("KTX", "missing KTX identifier"));
    }
    let _endianness = reader.read_u32_le()?;
    let _gl_type = reader.read_u32_le()?;
    let _gl_type_size = reader.read_u32_le()?;
    let _gl_format = reader.read_u32_le()?;
    let gl_internal_format = reader.read_u32_le()?;
    let _gl_base_internal_format = reader.read_u32_le()?;
    let width = reader.read_u32_le()?;
    let height = reader.read_u32_le()?;
    let _depth = reader.read_u32_le()?;
    let _array_elements = reader.read_u32_le()?;
    let _faces = reader.read_u32_le()?;
    let mip_count = reader.read_u32_le()?;
    let key_value_bytes = reader.read_u32_le()?;

    if width == 0 || height == 0 {
        return Err(TextureError::malformed("KTX", "zero texture extent"));
    }

    let (native, variant, block_size) = match gl_internal_format {
        GL_ATC_RGB_AMD => (PixelFormat::AtcRgb, AtcVariant::Rgb, 8),
        GL_ATC_RGBA_EXPLICIT_ALPHA_AMD => {
            (PixelFormat::AtcExplicitAlpha, AtcVariant::ExplicitAlpha, 16)
        }
        GL_ATC_RGBA_INTERPOLATED_ALPHA_AMD => (
            PixelFormat::AtcInterpolatedAlpha,
            AtcVariant::InterpolatedAlpha,
            16,
        ),
        other => {
            return Err(TextureError::unsupported_format(format!(
                "KTX internal format 0x{other:04x}"
            )))
        }
    };

    let mips = mip_count.max(1);
    if mips as usize > MAX_MIPMAPS {
        return Err(TextureError::MipBudgetExceeded {
            count: mips,
            limit: MAX_MIPMAPS as u32,
        });
    }

    // Key/value metadata, then the first level's image size prefix
    reader.skip(key_value_bytes as usize)?;
    reader.skip(IMAGE_SIZE_PREFIX)?;
    let payload = &data[reader.position()..];
    if payload.is_empty() {
        return Err(TextureError::malformed("KTX", "missing pixel data"));
    }

    if caps.atitc {
        let chain = hardware_chain(payload, width, height, mips, block_size);
        Ok(DecodedImage::new(
            width,
            height,
            ContainerFormat::Atitc,
            native,
            false,
            chain,
        ))
    } else {
        tracing::warn!(?variant, "no hardware ATC decoder, decompressing in software");
        let chain = software_chain(payload, width, height, mips, block_size, variant)?;
        Ok(DecodedImage::new(
            width,
            height,
            ContainerFormat::Atitc,
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
        // Skip the next level's image size prefix
        offset += size + IMAGE_SIZE_PREFIX;
        width >>= 1;
        height >>= 1;
    }
    MipmapChain::Packed {
        data: payload.to_vec(),
        slices,
    }
}

fn software_chain(
    payload: &[u8],
    width: u32,
    height: u32,
    mips: u32,
    block_size: u32,
    variant: AtcVariant,
) -> Result<MipmapChain> {
    let total = mipmap::decoded_chain_size("KTX", width, height, mips as usize)?;
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
        let rgba = software::decode_atitc(source, level_width, level_height, variant)?;
        decoded[decode_offset..decode_offset + rgba.len()].copy_from_slice(&rgba);
        slices.push(Mipmap {
            offset: decode_offset,
            len: rgba.len(),
        });
        decode_offset += rgba.len();
        encode_offset +=
            mipmap::block4_level_size(level_width, level_height, block_size) + IMAGE_SIZE_PREFIX;
        width >>= 1;
        height >>= 1;
    }
    Ok(MipmapChain::Packed {
        data: decoded,
        slices,
    })
}
