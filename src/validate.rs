//! Alpha usage classification and statistics.
//!
//! [`validate`] inspects a buffer's alpha channel and reports how it is used:
//! missing, solid, effectively constant, a hard cut-out, or a real gradient.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::PixelBuffer;

/// Default `max - min` spread at or below which alpha counts as near-constant.
pub const DEFAULT_NEAR_CONSTANT_TOLERANCE: u8 = 4;

/// How an image uses its alpha channel.
///
/// Classes are tested in declaration order (after `NoAlpha`) and the first
/// match wins, so a uniformly opaque image is `AllOpaque`, never
/// `NearConstant` or `Binary`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlphaClass {
    /// The layout has no alpha channel.
    NoAlpha,
    /// Every sample is 255.
    AllOpaque,
    /// Every sample is 0.
    AllTransparent,
    /// Present but carrying no meaningful variation.
    NearConstant,
    /// Every sample is either 0 or 255.
    Binary,
    /// Full gradient usage.
    Varying,
}

impl AlphaClass {
    /// Short lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            AlphaClass::NoAlpha => "no_alpha",
            AlphaClass::AllOpaque => "all_opaque",
            AlphaClass::AllTransparent => "all_transparent",
            AlphaClass::NearConstant => "near_constant",
            AlphaClass::Binary => "binary",
            AlphaClass::Varying => "varying",
        }
    }
}

/// Overall verdict for texture workflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    /// `PASS`, `WARN` or `FAIL`.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        }
    }
}

/// Validation thresholds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationRules {
    /// Largest `max - min` alpha spread classified as near-constant.
    pub near_constant_tolerance: u8,
    /// Report `Fail` instead of `Warn` for images without alpha.
    pub require_alpha: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            near_constant_tolerance: DEFAULT_NEAR_CONSTANT_TOLERANCE,
            require_alpha: false,
        }
    }
}

impl ValidationRules {
    /// Set the widest `max - min` spread still classified as near-constant.
    ///
    /// Alpha planes whose spread is at most `tolerance` (and which are not
    /// fully transparent or fully opaque) produce a WARN.
    pub fn with_near_constant_tolerance(mut self, tolerance: u8) -> Self {
        self.near_constant_tolerance = tolerance;
        self
    }

    /// When set, buffers without an alpha channel FAIL instead of WARN.
    pub fn with_require_alpha(mut self, require_alpha: bool) -> Self {
        self.require_alpha = require_alpha;
        self
    }
}

/// Result of [`validate`].
///
/// For [`AlphaClass::NoAlpha`] the min/max/mean/std fields hold
/// [`ValidationReport::NOT_MEANINGFUL`] and every fraction is 0.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub struct ValidationReport {
    pub classification: AlphaClass,
    pub status: Status,
    pub width: u32,
    pub height: u32,
    /// Smallest alpha sample.
    pub min: i32,
    /// Largest alpha sample.
    pub max: i32,
    /// Exact mean alpha.
    pub mean: f64,
    /// Population standard deviation of alpha.
    pub std_dev: f64,
    /// Share of pixels with alpha == 0.
    pub fraction_transparent: f64,
    /// Share of pixels with alpha == 255.
    pub fraction_opaque: f64,
    /// Share of pixels with 0 < alpha < 255.
    pub fraction_partial: f64,
    /// Share of pixels within the near-constant tolerance of the most
    /// frequent alpha value.
    pub fraction_near_constant: f64,
}

impl ValidationReport {
    /// Sentinel for statistics that do not exist without an alpha channel.
    pub const NOT_MEANINGFUL: i32 = -1;

    fn no_alpha(source: &PixelBuffer, rules: &ValidationRules) -> Self {
        Self {
            classification: AlphaClass::NoAlpha,
            status: status_for(AlphaClass::NoAlpha, rules),
            width: source.width(),
            height: source.height(),
            min: Self::NOT_MEANINGFUL,
            max: Self::NOT_MEANINGFUL,
            mean: f64::from(Self::NOT_MEANINGFUL),
            std_dev: f64::from(Self::NOT_MEANINGFUL),
            fraction_transparent: 0.0,
            fraction_opaque: 0.0,
            fraction_partial: 0.0,
            fraction_near_constant: 0.0,
        }
    }

    /// Number of pixels examined.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the source had an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.classification != AlphaClass::NoAlpha
    }

    /// `(min, max)` alpha, when meaningful.
    pub fn alpha_range(&self) -> Option<(u8, u8)> {
        if !self.has_alpha() {
            return None;
        }
        Some((self.min as u8, self.max as u8))
    }

    /// Mean alpha rounded half-up to an integer, when meaningful.
    ///
    /// A mean of 127.5 rounds to 128.
    pub fn rounded_mean(&self) -> Option<u8> {
        if !self.has_alpha() {
            return None;
        }
        Some(libm::floor(self.mean + 0.5).clamp(0.0, 255.0) as u8)
    }

    /// Human-readable findings behind a non-`Pass` status.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        match self.classification {
            AlphaClass::NoAlpha => messages.push(String::from("No alpha channel.")),
            AlphaClass::AllOpaque => messages.push(format!(
                "Alpha is all opaque ({:.2}% == 255).",
                self.fraction_opaque * 100.0
            )),
            AlphaClass::AllTransparent => messages.push(format!(
                "Alpha is all transparent ({:.2}% == 0).",
                self.fraction_transparent * 100.0
            )),
            AlphaClass::NearConstant => messages.push(format!(
                "Alpha is near-constant (std={:.3}, range={}).",
                self.std_dev,
                self.max - self.min
            )),
            AlphaClass::Binary | AlphaClass::Varying => {}
        }
        messages
    }
}

/// Classify `source`'s alpha usage with [`ValidationRules::default`].
pub fn validate(source: &PixelBuffer) -> ValidationReport {
    validate_with(source, &ValidationRules::default())
}

/// Classify `source`'s alpha usage with explicit rules.
pub fn validate_with(source: &PixelBuffer, rules: &ValidationRules) -> ValidationReport {
    let Some(img) = source.as_rgba() else {
        log::debug!(
            "validate {}x{} {:?}: no alpha channel",
            source.width(),
            source.height(),
            source.layout()
        );
        return ValidationReport::no_alpha(source, rules);
    };

    let bins = crate::par::histogram(img.buf(), |px| px.a);
    let stats = HistogramStats::new(&bins, rules.near_constant_tolerance);
    let classification = stats.classify(rules.near_constant_tolerance);
    let status = status_for(classification, rules);

    log::debug!(
        "validate {}x{}: {:?} (min {}, max {}, mean {:.3})",
        source.width(),
        source.height(),
        classification,
        stats.min,
        stats.max,
        stats.mean
    );

    let total = stats.total as f64;
    ValidationReport {
        classification,
        status,
        width: source.width(),
        height: source.height(),
        min: i32::from(stats.min),
        max: i32::from(stats.max),
        mean: stats.mean,
        std_dev: stats.std_dev,
        fraction_transparent: bins[0] as f64 / total,
        fraction_opaque: bins[255] as f64 / total,
        fraction_partial: stats.partial as f64 / total,
        fraction_near_constant: stats.near_mode as f64 / total,
    }
}

fn status_for(classification: AlphaClass, rules: &ValidationRules) -> Status {
    match classification {
        AlphaClass::NoAlpha if rules.require_alpha => Status::Fail,
        AlphaClass::NoAlpha
        | AlphaClass::AllOpaque
        | AlphaClass::AllTransparent
        | AlphaClass::NearConstant => Status::Warn,
        AlphaClass::Binary | AlphaClass::Varying => Status::Pass,
    }
}

/// Summary statistics over a 256-bin alpha histogram.
struct HistogramStats {
    total: u64,
    min: u8,
    max: u8,
    mean: f64,
    std_dev: f64,
    partial: u64,
    near_mode: u64,
}

impl HistogramStats {
    fn new(bins: &[u64; 256], tolerance: u8) -> Self {
        let total: u64 = bins.iter().sum();
        let occupied = |v: &usize| bins[*v] > 0;
        // Buffers are never empty, so at least one bin is occupied.
        let min = (0..256).find(occupied).unwrap_or(0) as u8;
        let max = (0..256).rev().find(occupied).unwrap_or(0) as u8;

        let sum: u64 = bins
            .iter()
            .enumerate()
            .map(|(v, &c)| v as u64 * c)
            .sum();
        let mean = sum as f64 / total as f64;
        let variance = bins
            .iter()
            .enumerate()
            .map(|(v, &c)| {
                let d = v as f64 - mean;
                d * d * c as f64
            })
            .sum::<f64>()
            / total as f64;

        let partial = bins[1..255].iter().sum();

        // Most frequent value; ties go to the lowest.
        let mode = bins
            .iter()
            .enumerate()
            .fold((0usize, 0u64), |best, (v, &c)| if c > best.1 { (v, c) } else { best })
            .0;
        let lo = mode.saturating_sub(usize::from(tolerance));
        let hi = (mode + usize::from(tolerance)).min(255);
        let near_mode = bins[lo..=hi].iter().sum();

        Self {
            total,
            min,
            max,
            mean,
            std_dev: libm::sqrt(variance),
            partial,
            near_mode,
        }
    }

    fn classify(&self, tolerance: u8) -> AlphaClass {
        if self.min == 255 && self.max == 255 {
            AlphaClass::AllOpaque
        } else if self.min == 0 && self.max == 0 {
            AlphaClass::AllTransparent
        } else if self.max - self.min <= tolerance {
            AlphaClass::NearConstant
        } else if self.partial == 0 {
            AlphaClass::Binary
        } else {
            AlphaClass::Varying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;
    use alloc::vec;

    fn rgba_with_alpha(width: u32, height: u32, alpha: &[u8]) -> PixelBuffer {
        let samples = alpha.iter().flat_map(|&a| [10, 20, 30, a]).collect();
        PixelBuffer::from_samples(width, height, ChannelLayout::Rgba, samples).unwrap()
    }

    #[test]
    fn binary_two_by_two() {
        let report = validate(&rgba_with_alpha(2, 2, &[255, 0, 255, 0]));
        assert_eq!(report.classification, AlphaClass::Binary);
        assert_eq!(report.status, Status::Pass);
        assert_eq!(report.min, 0);
        assert_eq!(report.max, 255);
        assert_eq!(report.pixel_count(), 4);
        assert_eq!(report.mean, 127.5);
        assert_eq!(report.rounded_mean(), Some(128));
        assert_eq!(report.fraction_transparent, 0.5);
        assert_eq!(report.fraction_opaque, 0.5);
        assert_eq!(report.fraction_partial, 0.0);
        assert_eq!(report.std_dev, 127.5);
        assert!(report.messages().is_empty());
    }

    #[test]
    fn no_alpha_uses_sentinels() {
        let rgb = PixelBuffer::from_samples(2, 1, ChannelLayout::Rgb, vec![0; 6]).unwrap();
        let report = validate(&rgb);
        assert_eq!(report.classification, AlphaClass::NoAlpha);
        assert_eq!(report.status, Status::Warn);
        assert_eq!(report.min, ValidationReport::NOT_MEANINGFUL);
        assert_eq!(report.max, ValidationReport::NOT_MEANINGFUL);
        assert_eq!(report.mean, -1.0);
        assert_eq!(report.fraction_transparent, 0.0);
        assert_eq!(report.fraction_opaque, 0.0);
        assert_eq!(report.fraction_near_constant, 0.0);
        assert_eq!(report.alpha_range(), None);
        assert_eq!(report.rounded_mean(), None);
        assert_eq!(report.messages(), vec![String::from("No alpha channel.")]);

        let gray = PixelBuffer::from_samples(1, 1, ChannelLayout::Grayscale, vec![0]).unwrap();
        assert_eq!(validate(&gray).classification, AlphaClass::NoAlpha);
    }

    #[test]
    fn require_alpha_fails_no_alpha() {
        let rgb = PixelBuffer::from_samples(1, 1, ChannelLayout::Rgb, vec![0; 3]).unwrap();
        let rules = ValidationRules::default().with_require_alpha(true);
        assert_eq!(validate_with(&rgb, &rules).status, Status::Fail);
    }

    #[test]
    fn all_opaque_beats_near_constant_and_binary() {
        let report = validate(&rgba_with_alpha(3, 1, &[255, 255, 255]));
        assert_eq!(report.classification, AlphaClass::AllOpaque);
        assert_eq!(report.status, Status::Warn);
        assert_eq!(report.fraction_opaque, 1.0);
        assert_eq!(report.fraction_near_constant, 1.0);
        assert_eq!(report.alpha_range(), Some((255, 255)));
    }

    #[test]
    fn all_transparent() {
        let report = validate(&rgba_with_alpha(2, 1, &[0, 0]));
        assert_eq!(report.classification, AlphaClass::AllTransparent);
        assert_eq!(report.fraction_transparent, 1.0);
        assert_eq!(
            report.messages(),
            vec![String::from("Alpha is all transparent (100.00% == 0).")]
        );
    }

    #[test]
    fn near_constant_at_default_tolerance() {
        let report = validate(&rgba_with_alpha(3, 1, &[250, 254, 252]));
        assert_eq!(report.classification, AlphaClass::NearConstant);
        assert_eq!(report.status, Status::Warn);

        // A spread of 5 is just outside the default tolerance of 4
        let report = validate(&rgba_with_alpha(2, 1, &[100, 105]));
        assert_eq!(report.classification, AlphaClass::Varying);
    }

    #[test]
    fn near_constant_respects_custom_tolerance() {
        let rules = ValidationRules::default().with_near_constant_tolerance(10);
        let report = validate_with(&rgba_with_alpha(2, 1, &[100, 105]), &rules);
        assert_eq!(report.classification, AlphaClass::NearConstant);
    }

    #[test]
    fn near_constant_catches_uniform_mid_value() {
        let report = validate(&rgba_with_alpha(2, 2, &[128; 4]));
        assert_eq!(report.classification, AlphaClass::NearConstant);
        assert_eq!(report.std_dev, 0.0);
    }

    #[test]
    fn small_spread_at_extremes_is_near_constant_not_binary() {
        // 0 and 3 are within tolerance; neither solid class applies
        let report = validate(&rgba_with_alpha(2, 1, &[0, 3]));
        assert_eq!(report.classification, AlphaClass::NearConstant);
    }

    #[test]
    fn varying_gradient() {
        let alpha: alloc::vec::Vec<u8> = (0..=255).collect();
        let report = validate(&rgba_with_alpha(16, 16, &alpha));
        assert_eq!(report.classification, AlphaClass::Varying);
        assert_eq!(report.min, 0);
        assert_eq!(report.max, 255);
        assert_eq!(report.fraction_partial, 254.0 / 256.0);
        let sum = report.fraction_transparent + report.fraction_opaque + report.fraction_partial;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn near_constant_fraction_tracks_mode() {
        // mode is 200; 198 and 204 are within 4, 10 is not
        let report = validate(&rgba_with_alpha(5, 1, &[200, 200, 198, 204, 10]));
        assert_eq!(report.classification, AlphaClass::Varying);
        assert_eq!(report.fraction_near_constant, 0.8);
    }

    #[test]
    fn every_class_is_reachable() {
        let cases: [(&[u8], AlphaClass); 5] = [
            (&[255, 255], AlphaClass::AllOpaque),
            (&[0, 0], AlphaClass::AllTransparent),
            (&[60, 62], AlphaClass::NearConstant),
            (&[0, 255], AlphaClass::Binary),
            (&[0, 128], AlphaClass::Varying),
        ];
        for (alpha, expected) in cases {
            let report = validate(&rgba_with_alpha(2, 1, alpha));
            assert_eq!(report.classification, expected, "alpha {alpha:?}");
        }
    }
}
