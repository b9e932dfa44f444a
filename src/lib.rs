//! # alphakit
//!
//! Alpha-channel toolkit for 8-bit raster images: pull the alpha plane out of
//! an RGBA image, put a mask back in, check whether an alpha channel is worth
//! keeping, and synthesize a mask from color.
//!
//! Everything works on an in-memory [`PixelBuffer`]. Decoding and encoding
//! image files is left to the caller (the `alphaimg` command-line tool does
//! it for PNG).
//!
//! ## Usage
//!
//! ```rust
//! use alphakit::{ChannelLayout, GenerationRule, PixelBuffer, Status};
//!
//! let rgba = PixelBuffer::from_samples(
//!     2,
//!     1,
//!     ChannelLayout::Rgba,
//!     vec![200, 10, 10, 255, 20, 20, 20, 0],
//! )?;
//!
//! // Split out the mask, edit it elsewhere, then put it back.
//! let mask = alphakit::split(&rgba)?;
//! assert_eq!(mask.samples(), &[255, 0]);
//! let rebuilt = alphakit::combine(&rgba, &mask)?;
//! assert_eq!(rebuilt, rgba);
//!
//! // Is the alpha channel meaningful?
//! let report = alphakit::validate(&rgba);
//! assert_eq!(report.status, Status::Pass);
//!
//! // Derive a mask from brightness instead.
//! let rule: GenerationRule = "threshold:50".parse()?;
//! let generated = alphakit::generate(&rgba, &rule)?;
//! assert_eq!(generated.samples(), &[255, 0]);
//! # Ok::<(), alphakit::AlphaError>(())
//! ```
//!
//! ## Features
//!
//! - `std` (default): `std::error::Error` for [`AlphaError`].
//! - `rayon`: per-pixel work runs on the rayon thread pool. Output is
//!   identical to the sequential path.
//! - `serde`: `Serialize`/`Deserialize` for reports and enums.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod channel;
mod combine;
mod error;
mod generate;
mod limits;
mod par;
mod split;
mod validate;

pub use buffer::{ChannelLayout, PixelBuffer};
pub use channel::{alpha_plane, grayscale, luminance, read_alpha, with_alpha};
pub use combine::{CombineOptions, combine, combine_with};
pub use error::{AlphaError, Result};
pub use generate::{GenerationRule, KeyedAs, ThresholdMode, generate};
pub use limits::Limits;
pub use split::{split, split_channels};
pub use validate::{
    AlphaClass, DEFAULT_NEAR_CONSTANT_TOLERANCE, Status, ValidationReport, ValidationRules,
    validate, validate_with,
};

pub use imgref::{ImgRef, ImgVec};
pub use rgb::{Gray, Rgb, Rgba};
