use crate::presets::ScenePreset;
use crate::render::OutputMode;
use clap::Parser;

/// photon-core — a physically-based Monte Carlo path tracer with a terminal
/// preview front-end. Mirrors the original CLI shape: a bare invocation runs
/// the interactive accumulate-and-display loop; `--rays <N>` instead renders
/// exactly `N` samples per pixel once and writes `image.bmp`/`image.rtdata`.
#[derive(Parser, Debug)]
#[command(
    name = "photon-core",
    version,
    about = "A physically-based Monte Carlo path tracer",
    after_help = "EXAMPLES:\n  \
                  photon-core --scene showcase --mode halfblock\n  \
                  photon-core --scene cornell --spp 256 --bounces 8\n  \
                  photon-core --scene minimal --rays 64 --seed 7"
)]
pub struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Showcase)]
    pub scene: ScenePreset,

    /// Output width in pixels
    #[arg(short = 'W', long, default_value_t = 120)]
    pub width: usize,

    /// Output height in pixels
    #[arg(short = 'H', long, default_value_t = 60)]
    pub height: usize,

    /// Samples per pixel per pass. Defaults to the preset's own setting.
    #[arg(long)]
    pub spp: Option<u32>,

    /// Maximum ray bounce depth. Defaults to the preset's own setting.
    #[arg(long)]
    pub bounces: Option<u32>,

    /// Terminal output encoding mode
    #[arg(short, long, value_enum, default_value_t = CliOutputMode::Halfblock)]
    pub mode: CliOutputMode,

    /// Disable gamma correction on the terminal preview
    #[arg(long)]
    pub no_gamma: bool,

    /// PRNG seed; the render is fully reproducible for a fixed seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Render exactly N samples per pixel, write image.bmp and
    /// image.rtdata, then exit instead of entering the interactive loop.
    #[arg(long)]
    pub rays: Option<u32>,

    /// Polygons per bounding-hierarchy leaf; 0 disables the hierarchy
    #[arg(long, default_value_t = 16)]
    pub polygons_per_bounding: usize,

    /// Use the multisample pathtrace variant, fanning N secondary rays out
    /// of the first hit per primary sample
    #[arg(long)]
    pub multisample: Option<u32>,

    /// Enable Russian-roulette path termination after the default min depth
    #[arg(long)]
    pub roulette: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliOutputMode {
    /// Unicode braille patterns — 2×4 subpixel resolution
    Braille,
    /// Full-block characters with 24-bit true color
    Truecolor,
    /// Half-block characters (▀) — 2 vertical pixels per cell
    Halfblock,
    /// ASCII grayscale density ramp
    Ascii,
}

impl From<CliOutputMode> for OutputMode {
    fn from(m: CliOutputMode) -> Self {
        match m {
            CliOutputMode::Braille => OutputMode::Braille,
            CliOutputMode::Truecolor => OutputMode::TrueColor,
            CliOutputMode::Halfblock => OutputMode::HalfBlock,
            CliOutputMode::Ascii => OutputMode::Ascii,
        }
    }
}
