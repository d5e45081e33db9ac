//! ETC1 container parsing from PKM files
//!
//! PKM is a 16-byte big-endian header in front of raw ETC1 blocks. The
//! header stores both the block-padded encoded extent and the actual
//! pixel extent; validity requires the two to agree within one block.

use crate::capabilities::DeviceCapabilities;
use crate::detect::ContainerFormat;
use crate::error::{Result, TextureError};
use crate::image::{DecodedImage, Mipmap, MipmapChain};
use crate::pixel_format::PixelFormat;
use crate::reader::HeaderReader;
use crate::software;

const PKM_HEADER_SIZE: usize = 16;
const PKM_MAGIC: &[u8; 6] = b"PKM 10";
// ETC1_RGB_NO_MIPMAPS
const PKM_TYPE_ETC1: u16 = 0;

struct PkmHeader {
    encoded_width: u16,
    encoded_height: u16,
    width: u16,
    height: u16,
}

fn read_header(data: &[u8]) -> Result<PkmHeader> {
    let mut reader = HeaderReader::new(data);
    let magic = reader.read_bytes(6)?;
    if magic != PKM_MAGIC {
        return Err(TextureError::malformed("PKM", "missing PKM 10 magic"));
    }
    let data_type = reader.read_u16_be()?;
    if data_type != PKM_TYPE_ETC1 {
        return Err(TextureError::unsupported_format(format!(
            "PKM data type {data_type}"
        )));
    }
    let header = PkmHeader {
        encoded_width: reader.read_u16_be()?,
        encoded_height: reader.read_u16_be()?,
        width: reader.read_u16_be()?,
        height: reader.read_u16_be()?,
    };
    if header.encoded_width < header.width
        || header.encoded_width - header.width >= 4
        || header.encoded_height < header.height
        || header.encoded_height - header.height >= 4
    {
        return Err(TextureError::malformed(
            "PKM",
            "encoded extent does not pad the pixel extent to a block multiple",
        ));
    }
    Ok(header)
}

/// True if the buffer starts with a consistent PKM header
pub(crate) fn is_valid_pkm(data: &[u8]) -> bool {
    data.len() >= PKM_HEADER_SIZE && read_header(data).is_ok()
}

/// Parse a PKM file. Hardware-capable devices keep the single ETC1
/// level compressed; otherwise it is decompressed to RGB888 (ETC1 has
/// no alpha to preserve).
pub fn parse(data: &[u8], caps: &DeviceCapabilities) -> Result<DecodedImage> {
    let header = read_header(data)?;
    let width = u32::from(header.width);
    let height = u32::from(header.height);
    if width == 0 || height == 0 {
        return Err(TextureError::malformed("PKM", "zero texture extent"));
    }

    let payload = &data[PKM_HEADER_SIZE..];
    if caps.etc1 {
        let chain = MipmapChain::Packed {
            data: payload.to_vec(),
            slices: vec![Mipmap {
                offset: 0,
                len: payload.len(),
            }],
        };
        Ok(DecodedImage::new(
            width,
            height,
            ContainerFormat::Etc,
            PixelFormat::Etc,
            false,
            chain,
        ))
    } else {
        tracing::warn!(width, height, "no hardware ETC1 decoder, decompressing in software");
        let level = software::decode_etc1(payload, width, height)?;
        Ok(DecodedImage::new(
            width,
            height,
            ContainerFormat::Etc,
            PixelFormat::Rgb888,
            false,
            MipmapChain::Unpacked {
                levels: vec![level],
            },
        ))
    }
}
