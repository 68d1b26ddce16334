//! Rendition presets.
//!
//! Bitrates are stored in bits per second and are always whole multiples of
//! 1024, matching how the ladder is written (`95 * 1024` and so on).

use serde::Serialize;

const K: u32 = 1024;

/// One resolution/bitrate encoding of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,
    /// Target audio bitrate in bits per second.
    pub audio_bitrate: u32,
}

impl Rendition {
    pub const fn new(width: u32, height: u32, video_bitrate: u32, audio_bitrate: u32) -> Self {
        Self {
            width,
            height,
            video_bitrate,
            audio_bitrate,
        }
    }

    /// `true` when every dimension and bitrate is non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.video_bitrate > 0 && self.audio_bitrate > 0
    }

    /// Short name such as `720p`.
    pub fn label(&self) -> String {
        format!("{}p", self.height)
    }

    /// Frame size in ffmpeg's `WxH` form.
    pub fn size_arg(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Video bitrate in ffmpeg's kilo form (`95k`).
    pub fn video_bitrate_arg(&self) -> String {
        kilo(self.video_bitrate)
    }

    /// Audio bitrate in ffmpeg's kilo form (`64k`).
    pub fn audio_bitrate_arg(&self) -> String {
        kilo(self.audio_bitrate)
    }
}

fn kilo(bits: u32) -> String {
    format!("{}k", bits / K)
}

/// The six-step ladder used for file conversion, lowest quality first.
pub const STANDARD_LADDER: [Rendition; 6] = [
    Rendition::new(256, 144, 95 * K, 64 * K),
    Rendition::new(426, 240, 150 * K, 94 * K),
    Rendition::new(640, 360, 276 * K, 128 * K),
    Rendition::new(854, 480, 750 * K, 192 * K),
    Rendition::new(1280, 720, 2048 * K, 320 * K),
    Rendition::new(1920, 1080, 4096 * K, 320 * K),
];

/// Optional steps above 1080p.
pub const UHD_RENDITIONS: [Rendition; 2] = [
    Rendition::new(2560, 1440, 6144 * K, 320 * K),
    Rendition::new(3840, 2160, 17408 * K, 320 * K),
];

/// The single rendition produced from a live capture device.
pub const CAPTURE_RENDITION: Rendition = Rendition::new(640, 480, 750 * K, 192 * K);

/// Renditions for file conversion, optionally extended past 1080p.
pub fn file_ladder(include_uhd: bool) -> Vec<Rendition> {
    let mut ladder = STANDARD_LADDER.to_vec();
    if include_uhd {
        ladder.extend_from_slice(&UHD_RENDITIONS);
    }
    ladder
}
