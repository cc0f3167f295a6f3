//! Named parameter profiles.

use crate::{Codec, DeinterlaceMode};

/// A named bundle of restoration/encoding defaults selectable by the caller.
///
/// Profile values sit between system defaults and explicit request fields in
/// precedence: explicit overrides profile overrides default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub name: &'static str,
    pub deinterlace: DeinterlaceMode,
    pub denoise_strength: f64,
    pub sharpen_strength: f64,
    pub brightness: f64,
    pub gamma: f64,
    pub contrast: f64,
    pub auto_exposure: bool,
    pub codec: Codec,
    pub crf: u8,
    pub preset: &'static str,
}

/// The fixed profile set.
pub const PROFILES: &[Profile] = &[
    Profile {
        name: "fast_preview",
        deinterlace: DeinterlaceMode::Auto,
        denoise_strength: 25.0,
        sharpen_strength: 10.0,
        brightness: 0.03,
        gamma: 1.03,
        contrast: 1.00,
        auto_exposure: false,
        codec: Codec::H264,
        crf: 20,
        preset: "faster",
    },
    Profile {
        name: "balanced",
        deinterlace: DeinterlaceMode::Auto,
        denoise_strength: 35.0,
        sharpen_strength: 20.0,
        brightness: 0.00,
        gamma: 1.00,
        contrast: 1.00,
        auto_exposure: false,
        codec: Codec::H265,
        crf: 20,
        preset: "medium",
    },
    Profile {
        name: "max_cleanup",
        deinterlace: DeinterlaceMode::On,
        denoise_strength: 45.0,
        sharpen_strength: 15.0,
        brightness: 0.00,
        gamma: 1.00,
        contrast: 1.00,
        auto_exposure: false,
        codec: Codec::H265,
        crf: 18,
        preset: "slow",
    },
    Profile {
        name: "dark_footage",
        deinterlace: DeinterlaceMode::Auto,
        denoise_strength: 35.0,
        sharpen_strength: 15.0,
        brightness: 0.08,
        gamma: 1.10,
        contrast: 1.04,
        auto_exposure: true,
        codec: Codec::H265,
        crf: 20,
        preset: "medium",
    },
];

/// Look up a profile by name.
pub fn profile_by_name(name: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// The known profile names, for validation messages.
pub fn profile_names() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.name).collect()
}
