//! Raw caller-supplied job request.

use serde::{Deserialize, Serialize};

use crate::Profile;

/// Raw restoration request as supplied by the caller.
///
/// Every field is optional at the type level; missing fields are filled
/// from the named profile (if any) and then from system defaults during
/// normalization. Explicit values always win over profile values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreRequest {
    /// Source video URL (http/https)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_url: Option<String>,

    /// Named parameter profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Deinterlace mode: auto|on|off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deinterlace: Option<String>,

    /// Denoise strength, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denoise_strength: Option<f64>,

    /// Sharpen strength, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpen_strength: Option<f64>,

    /// Brightness adjustment, -1.0..1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,

    /// Gamma adjustment, 0.6..1.8
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,

    /// Contrast adjustment, 0.5..1.5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,

    /// Apply the automatic exposure nudge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_exposure: Option<bool>,

    /// Super-resolution model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Target resolution as WIDTHxHEIGHT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_resolution: Option<String>,

    /// Video codec: h264|h265
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,

    /// Output container: mp4|mkv
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Keep the source audio track
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_audio: Option<bool>,

    /// Encoder preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Constant rate factor (quantization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crf: Option<u8>,
}

impl RestoreRequest {
    /// Overlay this request on top of a profile: profile values fill
    /// whatever the caller left unset, explicit values always win.
    pub fn merged_with(&self, profile: &Profile) -> Self {
        Self {
            input_url: self.input_url.clone(),
            profile: self.profile.clone(),
            deinterlace: self
                .deinterlace
                .clone()
                .or_else(|| Some(profile.deinterlace.to_string())),
            denoise_strength: self.denoise_strength.or(Some(profile.denoise_strength)),
            sharpen_strength: self.sharpen_strength.or(Some(profile.sharpen_strength)),
            brightness: self.brightness.or(Some(profile.brightness)),
            gamma: self.gamma.or(Some(profile.gamma)),
            contrast: self.contrast.or(Some(profile.contrast)),
            auto_exposure: self.auto_exposure.or(Some(profile.auto_exposure)),
            model: self.model.clone(),
            target_resolution: self.target_resolution.clone(),
            codec: self.codec.clone().or_else(|| Some(profile.codec.to_string())),
            container: self.container.clone(),
            keep_audio: self.keep_audio,
            preset: self.preset.clone().or_else(|| Some(profile.preset.to_string())),
            crf: self.crf.or(Some(profile.crf)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_by_name;

    #[test]
    fn test_explicit_wins_over_profile() {
        let profile = profile_by_name("fast_preview").unwrap();
        let request = RestoreRequest {
            denoise_strength: Some(60.0),
            ..Default::default()
        };

        let merged = request.merged_with(profile);
        assert_eq!(merged.denoise_strength, Some(60.0));
        // Unset fields come from the profile
        assert_eq!(merged.sharpen_strength, Some(10.0));
        assert_eq!(merged.codec.as_deref(), Some("h264"));
        assert_eq!(merged.preset.as_deref(), Some("faster"));
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let request: RestoreRequest = serde_json::from_str(
            r#"{"input_url": "https://x/a.mp4", "profile": "balanced", "crf": 22}"#,
        )
        .unwrap();
        assert_eq!(request.input_url.as_deref(), Some("https://x/a.mp4"));
        assert_eq!(request.profile.as_deref(), Some("balanced"));
        assert_eq!(request.crf, Some(22));
        assert!(request.brightness.is_none());
    }
}
