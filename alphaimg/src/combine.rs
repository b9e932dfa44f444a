//! `combine`: apply a mask PNG as the alpha channel of a color PNG.

use alphakit::{ChannelLayout, CombineOptions, Limits};
use anyhow::Context;

use crate::CombineArgs;
use crate::codec;
use crate::output::OutputConfig;

/// Run the `combine` subcommand.
pub fn run(args: CombineArgs, limits: &Limits) -> anyhow::Result<()> {
    let color = codec::read_png(&args.color, limits)?;
    let mut mask = codec::read_png(&args.mask, limits)?;
    if mask.layout() != ChannelLayout::Grayscale {
        log::info!(
            "{} is {:?}, reducing to luminance",
            args.mask.display(),
            mask.layout()
        );
        mask = alphakit::grayscale(&mask);
    }

    let output = OutputConfig::new(&args.out, "_rgba")
        .prepare(&[args.color.as_path(), args.mask.as_path()])?;

    let options = CombineOptions::new().with_invert_mask(args.invert);
    let combined = alphakit::combine_with(&color, &mask, &options).with_context(|| {
        format!(
            "combining {} with {}",
            args.color.display(),
            args.mask.display()
        )
    })?;

    codec::write_png(&output, &combined)?;
    eprintln!(
        "{} + {} -> {}",
        args.color.display(),
        args.mask.display(),
        output.display()
    );
    Ok(())
}
