//! Container format detection by magic-byte sniffing

use serde::{Deserialize, Serialize};

use crate::container::{etc1, pvr};

/// Outer container formats this crate can tell apart.
///
/// `Tga` is never returned by [`detect`]: TGA has no reliable signature
/// and is only tried by the caller as a last resort after `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContainerFormat {
    Png,
    Jpg,
    Tiff,
    Webp,
    Pvr,
    Etc,
    S3tc,
    Atitc,
    Tga,
    #[default]
    Unknown,
}

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
const JPG_SOI: [u8; 2] = [0xFF, 0xD8];

fn is_png(data: &[u8]) -> bool {
    data.len() > 8 && data[..8] == PNG_SIGNATURE
}

fn is_jpg(data: &[u8]) -> bool {
    data.len() > 4 && data[..2] == JPG_SOI
}

fn is_tiff(data: &[u8]) -> bool {
    if data.len() <= 4 {
        return false;
    }
    (&data[..2] == b"II" && data[2] == 42 && data[3] == 0)
        || (&data[..2] == b"MM" && data[2] == 0 && data[3] == 42)
}

fn is_webp(data: &[u8]) -> bool {
    data.len() > 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

fn is_s3tc(data: &[u8]) -> bool {
    data.len() >= 4 && &data[..3] == b"DDS"
}

fn is_atitc(data: &[u8]) -> bool {
    data.len() >= 4 && &data[1..4] == b"KTX"
}

/// Detect the container format of a byte buffer.
///
/// Total over all inputs: an empty or unrecognized buffer yields
/// [`ContainerFormat::Unknown`], never an error. Checks run in a fixed
/// priority order and short-circuit on the first match, because some
/// signatures could coincidentally overlap on malformed input.
pub fn detect(data: &[u8]) -> ContainerFormat {
    let format = if is_png(data) {
        ContainerFormat::Png
    } else if is_jpg(data) {
        ContainerFormat::Jpg
    } else if is_tiff(data) {
        ContainerFormat::Tiff
    } else if is_webp(data) {
        ContainerFormat::Webp
    } else if pvr::is_pvr(data) {
        ContainerFormat::Pvr
    } else if etc1::is_valid_pkm(data) {
        ContainerFormat::Etc
    } else if is_s3tc(data) {
        ContainerFormat::S3tc
    } else if is_atitc(data) {
        ContainerFormat::Atitc
    } else {
        ContainerFormat::Unknown
    };
    tracing::debug!(?format, len = data.len(), "detected container format");
    format
}
