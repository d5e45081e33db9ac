//! Wrappers over the external software block decompressors
//!
//! `texture2ddecoder` emits BGRA-packed `u32` pixels; the graphics
//! backend consumes byte-ordered RGBA8888 (or RGB888 for the ETC1
//! fallback), so every wrapper swizzles on the way out.

use crate::error::{Result, TextureError};
use crate::mipmap::alloc_output;

/// S3TC sub-format selector for the block decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum S3tcVariant {
    Dxt1,
    Dxt3,
    Dxt5,
}

/// ATITC sub-format selector for the block decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtcVariant {
    Rgb,
    ExplicitAlpha,
    InterpolatedAlpha,
}

fn decode_pixels<F>(width: u32, height: u32, what: &'static str, decode: F) -> Result<Vec<u32>>
where
    F: FnOnce(&mut [u32]) -> std::result::Result<(), &'static str>,
{
    let pixels = (width as usize).saturating_mul(height as usize);
    let mut output: Vec<u32> = Vec::new();
    output
        .try_reserve_exact(pixels)
        .map_err(|_| TextureError::AllocationFailure {
            bytes: pixels.saturating_mul(4),
        })?;
    output.resize(pixels, 0);
    decode(&mut output)
        .map_err(|e| TextureError::software_decode(format!("{what}: {e}")))?;
    Ok(output)
}

fn bgra_words_to_rgba(pixels: &[u32]) -> Result<Vec<u8>> {
    let mut rgba = alloc_output(pixels.len() * 4)?;
    for (bytes, &pixel) in rgba.chunks_exact_mut(4).zip(pixels) {
        bytes[0] = (pixel >> 16) as u8;
        bytes[1] = (pixel >> 8) as u8;
        bytes[2] = pixel as u8;
        bytes[3] = (pixel >> 24) as u8;
    }
    Ok(rgba)
}

fn bgra_words_to_rgb(pixels: &[u32]) -> Result<Vec<u8>> {
    let mut rgb = alloc_output(pixels.len() * 3)?;
    for (bytes, &pixel) in rgb.chunks_exact_mut(3).zip(pixels) {
        bytes[0] = (pixel >> 16) as u8;
        bytes[1] = (pixel >> 8) as u8;
        bytes[2] = pixel as u8;
    }
    Ok(rgb)
}

/// Decode PVRTC blocks to an RGBA8888 buffer of `width * height * 4` bytes
pub(crate) fn decode_pvrtc(data: &[u8], width: u32, height: u32, is_2bpp: bool) -> Result<Vec<u8>> {
    let pixels = decode_pixels(width, height, "PVRTC", |out| {
        texture2ddecoder::decode_pvrtc(data, width as usize, height as usize, out, is_2bpp)
    })?;
    bgra_words_to_rgba(&pixels)
}

/// Decode ETC1 blocks to an RGB888 buffer of `width * height * 3` bytes
pub(crate) fn decode_etc1(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let pixels = decode_pixels(width, height, "ETC1", |out| {
        texture2ddecoder::decode_etc1(data, width as usize, height as usize, out)
    })?;
    bgra_words_to_rgb(&pixels)
}

/// Decode S3TC blocks to an RGBA8888 buffer of `width * height * 4` bytes
pub(crate) fn decode_s3tc(
    data: &[u8],
    width: u32,
    height: u32,
    variant: S3tcVariant,
) -> Result<Vec<u8>> {
    let pixels = decode_pixels(width, height, "S3TC", |out| {
        let (w, h) = (width as usize, height as usize);
        match variant {
            S3tcVariant::Dxt1 => texture2ddecoder::decode_bc1(data, w, h, out),
            S3tcVariant::Dxt3 => texture2ddecoder::decode_bc2(data, w, h, out),
            S3tcVariant::Dxt5 => texture2ddecoder::decode_bc3(data, w, h, out),
        }
    })?;
    bgra_words_to_rgba(&pixels)
}

/// Decode ATITC blocks to an RGBA8888 buffer of `width * height * 4` bytes
pub(crate) fn decode_atitc(
    data: &[u8],
    width: u32,
    height: u32,
    variant: AtcVariant,
) -> Result<Vec<u8>> {
    let pixels = decode_pixels(width, height, "ATITC", |out| {
        let (w, h) = (width as usize, height as usize);
        match variant {
            AtcVariant::Rgb => texture2ddecoder::decode_atc_rgb4(data, w, h, out),
            // The decoder exposes a single RGBA entry point for both
            // alpha encodings.
            AtcVariant::ExplicitAlpha | AtcVariant::InterpolatedAlpha => {
                texture2ddecoder::decode_atc_rgba8(data, w, h, out)
            }
        }
    })?;
    bgra_words_to_rgba(&pixels)
}
