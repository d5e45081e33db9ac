//! Container-specific parsers
//!
//! Each submodule owns one compressed texture container: header
//! validation, pixel-format negotiation against the device capabilities
//! and mipmap chain extraction, either as compressed slices for hardware
//! decode or software-decompressed buffers.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod atitc;
pub mod etc1;
pub mod pvr;
pub mod s3tc;

/// Per-call knobs for a decode.
///
/// The default value reproduces the process-wide configuration, so
/// `decode` and `decode_with_options(.., &DecodeOptions::default())`
/// behave identically.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Whether PVR v2 payloads were premultiplied by their encoder.
    ///
    /// The v2 header cannot record this, so it is declared out of band;
    /// `None` falls back to [`pvr_premultiplied_alpha`]. PVR v3 carries
    /// the flag in its header and ignores this option.
    pub pvr2_premultiplied_alpha: Option<bool>,
}

static PVR_PREMULTIPLIED_ALPHA: AtomicBool = AtomicBool::new(false);

/// Declare whether PVR v2 files fed to this process carry premultiplied
/// alpha. Off by default.
pub fn set_pvr_premultiplied_alpha(enabled: bool) {
    PVR_PREMULTIPLIED_ALPHA.store(enabled, Ordering::Relaxed);
}

/// The current process-wide PVR v2 premultiplied-alpha declaration
pub fn pvr_premultiplied_alpha() -> bool {
    PVR_PREMULTIPLIED_ALPHA.load(Ordering::Relaxed)
}

impl DecodeOptions {
    pub(crate) fn pvr2_premultiplied(&self) -> bool {
        self.pvr2_premultiplied_alpha
            .unwrap_or_else(pvr_premultiplied_alpha)
    }
}
