//! Mask synthesis from color.
//!
//! A [`GenerationRule`] picks exactly one strategy:
//!
//! - [`Luminance`](GenerationRule::Luminance): graded mask, bright areas opaque.
//! - [`Threshold`](GenerationRule::Threshold): binary cut on luminance.
//! - [`ColorKey`](GenerationRule::ColorKey): binary membership test on RGB
//!   distance to a key color.
//!
//! Rules also parse from short strings such as `threshold:128:below` or
//! `colorkey:#00ff00:20`, which is how the command-line tool accepts them.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use rgb::{Gray, Rgb};

use crate::channel::luminance_of;
use crate::{AlphaError, PixelBuffer, Result};

/// Which side of the cut becomes opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ThresholdMode {
    /// `luminance >= cut` is opaque, everything below is transparent.
    #[default]
    AboveOpaque,
    /// `luminance >= cut` is transparent, everything below is opaque.
    AboveTransparent,
}

/// What keyed (matching) pixels become.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyedAs {
    /// Keyed pixels are 0, the rest 255.
    #[default]
    Transparent,
    /// Keyed pixels are 255, the rest 0.
    Opaque,
}

/// How [`generate`] derives a mask from color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GenerationRule {
    /// `mask = luminance(r, g, b)`.
    Luminance,
    /// `mask = 255` or `0` depending on `luminance(r, g, b) >= cut`.
    Threshold { cut: u8, mode: ThresholdMode },
    /// `mask = 0` or `255` depending on whether the Euclidean RGB distance to
    /// `key` is at most `tolerance` (0 to 255).
    ColorKey {
        key: Rgb<u8>,
        tolerance: f32,
        keyed: KeyedAs,
    },
}

impl GenerationRule {
    /// Threshold at `cut`, bright pixels opaque.
    pub fn threshold(cut: u8) -> Self {
        GenerationRule::Threshold {
            cut,
            mode: ThresholdMode::AboveOpaque,
        }
    }

    /// Key out `key` within `tolerance`, keyed pixels transparent.
    pub fn color_key(key: Rgb<u8>, tolerance: f32) -> Self {
        GenerationRule::ColorKey {
            key,
            tolerance,
            keyed: KeyedAs::Transparent,
        }
    }

    /// Reject out-of-range parameters.
    pub fn check(&self) -> Result<()> {
        match *self {
            GenerationRule::Luminance | GenerationRule::Threshold { .. } => Ok(()),
            GenerationRule::ColorKey { tolerance, .. } => {
                if tolerance.is_finite() && (0.0..=255.0).contains(&tolerance) {
                    Ok(())
                } else {
                    Err(AlphaError::InvalidRule(format!(
                        "tolerance must be between 0 and 255, got {tolerance}"
                    )))
                }
            }
        }
    }
}

impl fmt::Display for GenerationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationRule::Luminance => f.write_str("luminance"),
            GenerationRule::Threshold { cut, mode } => {
                let side = match mode {
                    ThresholdMode::AboveOpaque => "above",
                    ThresholdMode::AboveTransparent => "below",
                };
                write!(f, "threshold:{cut}:{side}")
            }
            GenerationRule::ColorKey {
                key,
                tolerance,
                keyed,
            } => {
                let keyed = match keyed {
                    KeyedAs::Transparent => "transparent",
                    KeyedAs::Opaque => "opaque",
                };
                write!(
                    f,
                    "colorkey:#{:02x}{:02x}{:02x}:{tolerance}:{keyed}",
                    key.r, key.g, key.b
                )
            }
        }
    }
}

impl FromStr for GenerationRule {
    type Err = AlphaError;

    /// Parse `luminance`, `threshold:<cut>[:above|below]` or
    /// `colorkey:<color>:<tolerance>[:transparent|opaque]`.
    ///
    /// `<color>` is `#rrggbb`, `rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let parts: Vec<&str> = lower.split(':').map(str::trim).collect();
        let rule = match parts.as_slice() {
            ["luminance" | "lum"] => GenerationRule::Luminance,
            ["threshold", cut, rest @ ..] => {
                let cut = parse_u8(cut, "threshold cut")?;
                let mode = match rest {
                    [] | ["above"] => ThresholdMode::AboveOpaque,
                    ["below"] => ThresholdMode::AboveTransparent,
                    _ => return Err(invalid(s, "expected threshold:<cut>[:above|below]")),
                };
                GenerationRule::Threshold { cut, mode }
            }
            ["colorkey", color, tolerance, rest @ ..] => {
                let key = parse_color(color)?;
                let tolerance: f32 = tolerance.parse().map_err(|_| {
                    AlphaError::InvalidRule(format!("tolerance is not a number: {tolerance:?}"))
                })?;
                let keyed = match rest {
                    [] | ["transparent"] => KeyedAs::Transparent,
                    ["opaque"] => KeyedAs::Opaque,
                    _ => {
                        return Err(invalid(
                            s,
                            "expected colorkey:<color>:<tolerance>[:transparent|opaque]",
                        ));
                    }
                };
                GenerationRule::ColorKey {
                    key,
                    tolerance,
                    keyed,
                }
            }
            _ => return Err(invalid(s, "unknown rule")),
        };
        rule.check()?;
        Ok(rule)
    }
}

fn invalid(input: &str, detail: &str) -> AlphaError {
    AlphaError::InvalidRule(format!("{detail}: {input:?}"))
}

fn parse_u8(value: &str, what: &str) -> Result<u8> {
    let n: i64 = value
        .parse()
        .map_err(|_| AlphaError::InvalidRule(format!("{what} is not an integer: {value:?}")))?;
    u8::try_from(n)
        .map_err(|_| AlphaError::InvalidRule(format!("{what} must be between 0 and 255, got {n}")))
}

fn parse_color(value: &str) -> Result<Rgb<u8>> {
    if value.contains(',') {
        let channels: Vec<&str> = value.split(',').map(str::trim).collect();
        let [r, g, b] = channels.as_slice() else {
            return Err(AlphaError::InvalidRule(format!(
                "key color needs three channels: {value:?}"
            )));
        };
        return Ok(Rgb::new(
            parse_u8(r, "red")?,
            parse_u8(g, "green")?,
            parse_u8(b, "blue")?,
        ));
    }

    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AlphaError::InvalidRule(format!(
            "key color must be #rrggbb or r,g,b: {value:?}"
        )));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| AlphaError::InvalidRule(format!("bad hex color: {value:?}")))
    };
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Synthesize a grayscale mask from an RGB or RGBA buffer.
///
/// Any alpha in `color` is ignored. Threshold and color-key masks are always
/// strictly binary (every sample 0 or 255); color keying is a hard
/// membership test and never grades by distance.
pub fn generate(color: &PixelBuffer, rule: &GenerationRule) -> Result<PixelBuffer> {
    rule.check()?;

    let mask = match *rule {
        GenerationRule::Luminance => color.map_rgb(|px| Gray::new(luminance_of(px))),
        GenerationRule::Threshold { cut, mode } => {
            let (hit, miss) = match mode {
                ThresholdMode::AboveOpaque => (255, 0),
                ThresholdMode::AboveTransparent => (0, 255),
            };
            color.map_rgb(|px| Gray::new(if luminance_of(px) >= cut { hit } else { miss }))
        }
        GenerationRule::ColorKey {
            key,
            tolerance,
            keyed,
        } => {
            let (hit, miss) = match keyed {
                KeyedAs::Transparent => (0, 255),
                KeyedAs::Opaque => (255, 0),
            };
            // f32 squared is exact in f64
            let limit = f64::from(tolerance) * f64::from(tolerance);
            color.map_rgb(|px| {
                let keyed = f64::from(distance_sq(px, key)) <= limit;
                Gray::new(if keyed { hit } else { miss })
            })
        }
    }
    .ok_or_else(|| AlphaError::unsupported("generate", color.layout()))?;

    log::debug!(
        "generated {}x{} mask with {rule}",
        color.width(),
        color.height()
    );
    Ok(PixelBuffer::gray(
        mask,
        color.width() as usize,
        color.height() as usize,
    ))
}

/// Squared Euclidean distance in RGB space.
#[inline]
fn distance_sq(a: Rgb<u8>, b: Rgb<u8>) -> u32 {
    let d = |x: u8, y: u8| {
        let d = u32::from(x.abs_diff(y));
        d * d
    };
    d(a.r, b.r) + d(a.g, b.g) + d(a.b, b.b)
}
