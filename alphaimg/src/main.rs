//! alphaimg: split, combine, validate and generate PNG alpha channels.
//!
//! Thin command-line front end over `alphakit`. Every subcommand reads PNG
//! files, runs one library operation, and writes PNG (or a report) back out.

mod batch;
mod codec;
mod combine;
mod generate;
mod output;
mod split;
mod validate;

use std::path::PathBuf;

use alphakit::{GenerationRule, Limits};
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "alphaimg", version, about, max_term_width = 100)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Reject images with more than this many pixels.
    #[arg(long, global = true, env = "ALPHAIMG_MAX_PIXELS")]
    max_pixels: Option<u64>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the alpha channel of an RGBA image as a grayscale mask.
    Split(SplitArgs),

    /// Apply a grayscale mask as the alpha channel of a color image.
    Combine(CombineArgs),

    /// Report whether images carry a meaningful alpha channel.
    Validate(ValidateArgs),

    /// Derive a mask from an image's colors.
    Generate(GenerateArgs),
}

/// Output path options shared by the writing subcommands.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output file (default: `<stem><suffix>.png` beside the input).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filename suffix for the default output path.
    #[arg(long)]
    pub suffix: Option<String>,

    /// Allow overwriting existing files.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `split` subcommand.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// RGBA input PNG.
    pub input: PathBuf,

    /// Also write the color channels (alpha dropped) to this path.
    #[arg(long)]
    pub rgb_out: Option<PathBuf>,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the `combine` subcommand.
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Color source PNG (RGB or RGBA).
    pub color: PathBuf,

    /// Mask PNG. Color masks are reduced to luminance first.
    pub mask: PathBuf,

    /// Use `255 - mask` as alpha.
    #[arg(long)]
    pub invert: bool,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Input files, directories or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Print reports as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also write a CSV report to this file.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Maximum spread around the dominant alpha value still counted as near-constant.
    #[arg(long, default_value_t = alphakit::DEFAULT_NEAR_CONSTANT_TOLERANCE)]
    pub tolerance: u8,

    /// Treat images without an alpha channel as failures.
    #[arg(long)]
    pub require_alpha: bool,

    /// Number of parallel workers (default: CPU count).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Color source PNG.
    pub input: PathBuf,

    /// `luminance`, `threshold:<cut>[:above|below]` or
    /// `colorkey:<#rrggbb|r,g,b>:<tolerance>[:transparent|opaque]`.
    #[arg(short, long, value_parser = parse_rule)]
    pub rule: GenerationRule,

    /// Write `255 - v` for every mask sample.
    #[arg(long)]
    pub invert: bool,

    #[command(flatten)]
    pub out: OutputArgs,
}

fn parse_rule(s: &str) -> Result<GenerationRule, String> {
    s.parse().map_err(|e: alphakit::AlphaError| e.to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let limits = match cli.max_pixels {
        Some(max) => Limits::none().with_max_pixels(max),
        None => Limits::none(),
    };

    match cli.command {
        Command::Split(args) => split::run(args, &limits),
        Command::Combine(args) => combine::run(args, &limits),
        Command::Validate(args) => validate::run(args, &limits),
        Command::Generate(args) => generate::run(args, &limits),
    }
}
