//! Decoded image aggregate and mipmap chain ownership

use crate::detect::ContainerFormat;
use crate::pixel_format::{PixelFormat, PixelFormatInfo};

/// One mipmap level as a byte range into a shared packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mipmap {
    /// Byte offset of the level inside the packed buffer
    pub offset: usize,
    /// Byte length of the level
    pub len: usize,
}

/// Storage for the mipmap chain of a decoded image.
///
/// The two variants are mutually exclusive per image and decided once at
/// parse time: either every level is a non-owning slice into one shared
/// buffer, or every level owns its own buffer. The type makes mixing the
/// two impossible.
#[derive(Debug, Clone)]
pub enum MipmapChain {
    /// One shared owned buffer, levels are `{offset, len}` slices into
    /// it. Used when compressed data is kept for hardware decode, and by
    /// the S3TC/ATITC software paths which size one decoded output
    /// buffer up front.
    Packed { data: Vec<u8>, slices: Vec<Mipmap> },
    /// Independently owned buffer per level. Used when PVR or PKM
    /// content is software-decoded level by level.
    Unpacked { levels: Vec<Vec<u8>> },
}

impl MipmapChain {
    /// Number of mipmap levels (level 0 = full resolution)
    pub fn len(&self) -> usize {
        match self {
            MipmapChain::Packed { slices, .. } => slices.len(),
            MipmapChain::Unpacked { levels } => levels.len(),
        }
    }

    /// True if the chain holds no levels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of one mipmap level
    pub fn level(&self, index: usize) -> Option<&[u8]> {
        match self {
            MipmapChain::Packed { data, slices } => {
                let slice = slices.get(index)?;
                data.get(slice.offset..slice.offset + slice.len)
            }
            MipmapChain::Unpacked { levels } => levels.get(index).map(Vec::as_slice),
        }
    }
}

/// A fully decoded pixel surface ready for upload to a graphics backend.
///
/// Created wholly by one decode call and read-only thereafter. Dropping
/// the image releases the primary buffer and, for unpacked chains, every
/// per-level buffer.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    container: ContainerFormat,
    render_format: PixelFormat,
    premultiplied_alpha: bool,
    chain: MipmapChain,
}

impl DecodedImage {
    pub(crate) fn new(
        width: u32,
        height: u32,
        container: ContainerFormat,
        render_format: PixelFormat,
        premultiplied_alpha: bool,
        chain: MipmapChain,
    ) -> Self {
        debug_assert!(!chain.is_empty(), "decoded image must have a mipmap level");
        Self {
            width,
            height,
            container,
            render_format,
            premultiplied_alpha,
            chain,
        }
    }

    /// Full-resolution width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Full-resolution height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The container format the image was parsed from
    pub fn container(&self) -> ContainerFormat {
        self.container
    }

    /// The pixel format the graphics backend will receive.
    ///
    /// Always a format the device capabilities accepted at decode time,
    /// possibly a software-decoded fallback rather than the file's
    /// native compressed format.
    pub fn render_format(&self) -> PixelFormat {
        self.render_format
    }

    /// Whether color channels are pre-scaled by alpha
    pub fn has_premultiplied_alpha(&self) -> bool {
        self.premultiplied_alpha
    }

    /// Primary pixel buffer: the shared packed buffer, or level 0 when
    /// the chain owns independent per-level buffers
    pub fn data(&self) -> &[u8] {
        match &self.chain {
            MipmapChain::Packed { data, .. } => data,
            MipmapChain::Unpacked { levels } => &levels[0],
        }
    }

    /// Number of mipmap levels (at least 1, level 0 = full resolution)
    pub fn mipmap_count(&self) -> usize {
        self.chain.len()
    }

    /// Bytes of one mipmap level
    pub fn mipmap(&self, level: usize) -> Option<&[u8]> {
        self.chain.level(level)
    }

    /// True if every mipmap level owns an independent buffer
    pub fn is_unpacked(&self) -> bool {
        matches!(self.chain, MipmapChain::Unpacked { .. })
    }

    /// The full mipmap chain
    pub fn mipmaps(&self) -> &MipmapChain {
        &self.chain
    }

    /// Metadata of the render format
    pub fn format_info(&self) -> PixelFormatInfo {
        self.render_format.info()
    }

    /// Bits per pixel of the render format
    pub fn bits_per_pixel(&self) -> u32 {
        self.format_info().bits_per_pixel
    }

    /// Whether the render format carries alpha
    pub fn has_alpha(&self) -> bool {
        self.format_info().has_alpha
    }

    /// Whether the render format is block-compressed
    pub fn is_compressed(&self) -> bool {
        self.format_info().compressed
    }
}
