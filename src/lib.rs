//! Decoding of compressed GPU texture containers
//!
//! Sniffs the container format of an in-memory asset and decodes the
//! four compressed-texture containers itself: PVR (v2 and v3), PKM
//! (ETC1), DDS (S3TC) and KTX (ATC). PNG, JPEG, TIFF and WEBP are
//! detected but left to external codecs.
//!
//! Decoding negotiates the payload's pixel format against the
//! [`DeviceCapabilities`] the caller captured from its graphics
//! backend: formats the device decodes in hardware are passed through
//! compressed, formats it cannot are decompressed in software to
//! RGBA8888 or RGB888.
//!
//! # Quick Start
//!
//! ```
//! use texture_container::{decode, DeviceCapabilities};
//!
//! # fn main() -> texture_container::Result<()> {
//! # let mut file = Vec::new();
//! # file.extend_from_slice(b"PKM 10\x00\x00");
//! # for v in [4u16, 4, 4, 4] { file.extend_from_slice(&v.to_be_bytes()); }
//! # file.extend_from_slice(&[0u8; 8]);
//! let caps = DeviceCapabilities::all();
//! let image = decode(&file, &caps)?;
//! assert_eq!((image.width(), image.height()), (4, 4));
//! println!("{:?}, {} mipmap level(s)", image.render_format(), image.mipmap_count());
//! # Ok(())
//! # }
//! ```

pub mod capabilities;
pub mod container;
pub mod detect;
pub mod error;
pub mod image;
pub mod pixel_format;
pub mod reader;

mod mipmap;
mod software;

pub use capabilities::DeviceCapabilities;
pub use container::{pvr_premultiplied_alpha, set_pvr_premultiplied_alpha, DecodeOptions};
pub use detect::{detect, ContainerFormat};
pub use error::{Result, TextureError};
pub use image::{DecodedImage, Mipmap, MipmapChain};
pub use pixel_format::{PixelFormat, PixelFormatInfo};

/// Decode a texture container with the process-wide defaults
pub fn decode(data: &[u8], caps: &DeviceCapabilities) -> Result<DecodedImage> {
    decode_with_options(data, caps, &DecodeOptions::default())
}

/// Decode a texture container.
///
/// The container is identified by magic-byte sniffing; callers never
/// declare the format. Containers handled by external codecs and
/// unrecognized data come back as errors, so a caller with its own TGA
/// or PNG path can match on the error and fall through.
pub fn decode_with_options(
    data: &[u8],
    caps: &DeviceCapabilities,
    options: &DecodeOptions,
) -> Result<DecodedImage> {
    match detect::detect(data) {
        ContainerFormat::Pvr => container::pvr::parse(data, caps, options),
        ContainerFormat::Etc => container::etc1::parse(data, caps),
        ContainerFormat::S3tc => container::s3tc::parse(data, caps),
        ContainerFormat::Atitc => container::atitc::parse(data, caps),
        format @ (ContainerFormat::Png
        | ContainerFormat::Jpg
        | ContainerFormat::Tiff
        | ContainerFormat::Webp) => Err(TextureError::UnsupportedContainer(format)),
        ContainerFormat::Tga | ContainerFormat::Unknown => Err(TextureError::UnknownContainer),
    }
}
