//! Video filter construction for the preprocess pass.
//!
//! The preprocess stage runs one ffmpeg invocation over a chain of, in
//! order: optional deinterlace, exposure adjustment, denoise, and optional
//! sharpen. Everything here is pure string construction; the orchestrator
//! decides which pieces go into the chain.

/// Primary deinterlace filter.
pub const DEINTERLACE_PRIMARY: &str = "bwdif";

/// Fallback deinterlace filter, substituted after a failed primary pass.
pub const DEINTERLACE_FALLBACK: &str = "yadif";

/// Policy coefficients for the automatic exposure nudge.
#[derive(Debug, Clone, Copy)]
pub struct ExposurePolicy {
    /// Overall nudge strength
    pub strength: f64,
    /// Cap on how far shadows are lifted
    pub shadow_lift_limit: f64,
    /// How aggressively highlights are protected (1.0 = fully)
    pub highlight_protect: f64,
}

impl Default for ExposurePolicy {
    fn default() -> Self {
        Self {
            strength: 0.35,
            shadow_lift_limit: 0.25,
            highlight_protect: 0.85,
        }
    }
}

/// Build the eq exposure filter and return it together with the applied
/// (possibly nudged) triple.
///
/// With auto-exposure off, the caller's values pass through unchanged. With
/// it on, each value is nudged by the policy coefficients and re-clamped
/// into its validated range; the nudged triple is what the metadata reports
/// and what downstream stages use.
pub fn build_exposure_filter(
    brightness: f64,
    gamma: f64,
    contrast: f64,
    auto_exposure: bool,
    policy: &ExposurePolicy,
) -> (String, f64, f64, f64) {
    let (b, g, c) = if auto_exposure {
        (
            (brightness + policy.strength * policy.shadow_lift_limit).clamp(-1.0, 1.0),
            (gamma + policy.strength * 0.3).clamp(0.6, 1.8),
            (contrast * (1.0 + (1.0 - policy.highlight_protect) * 0.1)).clamp(0.5, 1.5),
        )
    } else {
        (brightness, gamma, contrast)
    };

    (
        format!("eq=brightness={:.3}:gamma={:.3}:contrast={:.3}", b, g, c),
        b,
        g,
        c,
    )
}

/// Build the hqdn3d denoise filter from a 0-100 strength.
///
/// Strength maps onto luma (0..4) and chroma (0..3) coefficients; the
/// temporal coefficients mirror the spatial ones.
pub fn build_denoise_filter(strength: u8) -> String {
    let luma = (f64::from(strength) / 25.0).clamp(0.0, 4.0);
    let chroma = (f64::from(strength) / 35.0).clamp(0.0, 3.0);
    format!("hqdn3d={:.2}:{:.2}:{:.2}:{:.2}", luma, chroma, luma, chroma)
}

/// Build the unsharp sharpen filter from a 0-100 strength.
///
/// Strength maps onto an unsharp amount of 0..1.5; negligible amounts
/// (<= 0.01) drop the filter from the chain entirely.
pub fn build_sharpen_filter(strength: u8) -> Option<String> {
    let amount = (f64::from(strength) / 100.0 * 1.5).clamp(0.0, 1.5);
    if amount <= 0.01 {
        return None;
    }
    Some(format!("unsharp=7:7:{:.2}:7:7:{:.2}", amount, amount))
}

/// Join filter fragments into one -vf chain.
pub fn join_chain(filters: &[String]) -> String {
    if filters.is_empty() {
        "null".to_string()
    } else {
        filters.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposure_passthrough_without_auto() {
        let (filter, b, g, c) = build_exposure_filter(0.1, 1.2, 0.9, false, &ExposurePolicy::default());
        assert_eq!(filter, "eq=brightness=0.100:gamma=1.200:contrast=0.900");
        assert_eq!((b, g, c), (0.1, 1.2, 0.9));
    }

    #[test]
    fn test_auto_exposure_nudges_and_clamps() {
        let policy = ExposurePolicy::default();
        let (_, b, g, c) = build_exposure_filter(0.0, 1.0, 1.0, true, &policy);

        // brightness += 0.35 * 0.25, gamma += 0.35 * 0.3, contrast *= 1.015
        assert!((b - 0.0875).abs() < 1e-9);
        assert!((g - 1.105).abs() < 1e-9);
        assert!((c - 1.015).abs() < 1e-9);
    }

    #[test]
    fn test_auto_exposure_never_leaves_validated_ranges() {
        let policy = ExposurePolicy::default();
        let (_, b, g, c) = build_exposure_filter(1.0, 1.8, 1.5, true, &policy);
        assert!(b <= 1.0);
        assert!(g <= 1.8);
        assert!(c <= 1.5);
    }

    #[test]
    fn test_denoise_mapping() {
        assert_eq!(build_denoise_filter(0), "hqdn3d=0.00:0.00:0.00:0.00");
        assert_eq!(build_denoise_filter(35), "hqdn3d=1.40:1.00:1.40:1.00");
        // Saturates at the filter's usable range
        assert_eq!(build_denoise_filter(100), "hqdn3d=4.00:2.86:4.00:2.86");
    }

    #[test]
    fn test_sharpen_negligible_amount_is_dropped() {
        assert!(build_sharpen_filter(0).is_none());
        assert_eq!(
            build_sharpen_filter(20).as_deref(),
            Some("unsharp=7:7:0.30:7:7:0.30")
        );
        assert_eq!(
            build_sharpen_filter(100).as_deref(),
            Some("unsharp=7:7:1.50:7:7:1.50")
        );
    }

    #[test]
    fn test_chain_join() {
        assert_eq!(join_chain(&[]), "null");
        assert_eq!(
            join_chain(&["bwdif".to_string(), "eq=brightness=0.000".to_string()]),
            "bwdif,eq=brightness=0.000"
        );
    }
}
