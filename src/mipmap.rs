//! Shared mipmap-chain size arithmetic

use crate::error::{Result, TextureError};

/// Ceiling on mipmap chain length for any container
pub(crate) const MAX_MIPMAPS: usize = 16;

/// Halve a texture extent, flooring at one pixel
pub(crate) fn half_extent(extent: u32) -> u32 {
    (extent >> 1).max(1)
}

/// Byte size of one PVR mipmap level.
///
/// Vendor encoders always emit at least a 2-block-wide/tall tile even
/// for 1x1 final mips, hence the minimum-2 clamp on the block counts.
/// The clamp is an empirical compatibility rule; callers bound the
/// result by the bytes actually remaining in the payload.
pub(crate) fn pvr_level_size(
    width: u32,
    height: u32,
    block_width: u32,
    block_height: u32,
    bpp: u32,
) -> usize {
    let width_blocks = (width / block_width).max(2) as usize;
    let height_blocks = (height / block_height).max(2) as usize;
    let block_bytes = (block_width * block_height * bpp) as usize / 8;
    // Saturating: callers clamp the result to the bytes remaining in the
    // payload, so an absurd header degrades into a short final level.
    width_blocks
        .saturating_mul(height_blocks)
        .saturating_mul(block_bytes)
}

/// Byte size of one 4x4-block-compressed level (S3TC/ATITC)
pub(crate) fn block4_level_size(width: u32, height: u32, block_size: u32) -> usize {
    (width.div_ceil(4) as usize)
        .saturating_mul(height.div_ceil(4) as usize)
        .saturating_mul(block_size as usize)
}

/// Total byte size of an RGBA8888 surface covering `mipmaps` levels of a
/// chain starting at `width` x `height`.
///
/// Computed before any decoding begins so the software-fallback paths can
/// size their output buffer once. Checked arithmetic: dimensions from a
/// hostile header that overflow the total are malformed input.
pub(crate) fn decoded_chain_size(
    container: &'static str,
    width: u32,
    height: u32,
    mipmaps: usize,
) -> Result<usize> {
    let mut total: u64 = 0;
    let (mut width, mut height) = (width, height);
    for _ in 0..mipmaps {
        if width == 0 && height == 0 {
            break;
        }
        let level = u64::from(width.max(1))
            .checked_mul(u64::from(height.max(1)))
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| TextureError::malformed(container, "mipmap chain size overflows"))?;
        total = total
            .checked_add(level)
            .ok_or_else(|| TextureError::malformed(container, "mipmap chain size overflows"))?;
        width >>= 1;
        height >>= 1;
    }
    usize::try_from(total)
        .map_err(|_| TextureError::malformed(container, "mipmap chain size overflows"))
}

/// Allocate a zeroed output buffer, reporting failure instead of aborting
pub(crate) fn alloc_output(bytes: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| TextureError::AllocationFailure { bytes })?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_extent_floors_at_one() {
        assert_eq!(half_extent(8), 4);
        assert_eq!(half_extent(3), 1);
        assert_eq!(half_extent(1), 1);
    }

    #[test]
    fn test_pvr_level_size_uncompressed() {
        // 4x4 RGBA8888: 1x1 blocks, no clamp kicks in
        assert_eq!(pvr_level_size(4, 4, 1, 1, 32), 64);
    }

    #[test]
    fn test_pvr_level_size_minimum_block_clamp() {
        // 1x1 PVRTC4 mip still claims a 2x2 block tile
        assert_eq!(pvr_level_size(1, 1, 4, 4, 4), 2 * 2 * 8);
        // 8x8 PVRTC4: 2x2 blocks of 8 bytes
        assert_eq!(pvr_level_size(8, 8, 4, 4, 4), 32);
        // 16x8 PVRTC2: 8x4 blocks
        assert_eq!(pvr_level_size(16, 8, 8, 4, 2), 2 * 2 * 8);
    }

    #[test]
    fn test_block4_level_size() {
        // DXT1 at 8x8: ceil(8/4)^2 * 8 = 32
        assert_eq!(block4_level_size(8, 8, 8), 32);
        // DXT5 at 10x6: ceil(10/4)=3, ceil(6/4)=2, 3*2*16 = 96
        assert_eq!(block4_level_size(10, 6, 16), 96);
        assert_eq!(block4_level_size(1, 1, 8), 8);
    }

    #[test]
    fn test_decoded_chain_size() {
        // 8x8 with 3 levels: 256 + 64 + 16
        assert_eq!(decoded_chain_size("DDS", 8, 8, 3).unwrap(), 336);
        // Chain stops once both extents are exhausted
        assert_eq!(decoded_chain_size("DDS", 1, 1, 5).unwrap(), 4);
    }

    #[test]
    fn test_decoded_chain_size_skews() {
        // 4x1: levels 4x1, 2x1(h floored), 1x1
        assert_eq!(decoded_chain_size("KTX", 4, 1, 3).unwrap(), 16 + 8 + 4);
    }
}
