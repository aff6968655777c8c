//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tapscan_core::domain::{Orientation, Point, Size};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "tapscan",
    bin_name = "tapscan",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Barcode scanner session simulator with tap-to-focus geometry",
    long_about = "tapscan computes letterboxed preview rectangles and normalized \
                  tap-to-focus regions, and replays scanner session scenarios \
                  against a simulated camera platform.",
    after_help = "EXAMPLES:\n\
        \x20 tapscan preview-rect --control 400x400 --stream 640x480\n\
        \x20 tapscan focus-region --tap 200,200 --control 400x400 --stream 640x480\n\
        \x20 tapscan simulate scenarios/coalesce.toml\n\
        \x20 tapscan completions bash > /usr/share/bash-completion/completions/tapscan",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute the part of a control that actually shows the stream.
    #[command(
        visible_alias = "rect",
        about = "Compute the letterboxed preview rectangle",
        after_help = "EXAMPLES:\n\
            \x20 tapscan preview-rect --control 400x400 --stream 640x480\n\
            \x20 tapscan preview-rect --control 300x400 --stream 640x480 --orientation portrait"
    )]
    PreviewRect(PreviewRectArgs),

    /// Convert a tap into a normalized focus region.
    #[command(
        visible_alias = "focus",
        about = "Compute the normalized focus region for a tap",
        after_help = "EXAMPLES:\n\
            \x20 tapscan focus-region --tap 200,200 --control 400x400 --stream 640x480\n\
            \x20 tapscan focus-region --tap 10,10 --control 400x300 --stream 640x480 --ratio 0.5\n\
            \x20 tapscan focus-region --tap 150,200 --control 300x400 --stream 640x480 \\\n\
            \x20     --orientation portrait --region 64x64"
    )]
    FocusRegion(FocusRegionArgs),

    /// Replay a scenario file against the simulated platform.
    #[command(
        visible_alias = "sim",
        about = "Replay a session scenario",
        after_help = "EXAMPLES:\n\
            \x20 tapscan simulate scenarios/coalesce.toml\n\
            \x20 tapscan simulate scenarios/tap-focus.toml --activity\n\
            \x20 tapscan --output-format json simulate scenarios/background.toml"
    )]
    Simulate(SimulateArgs),

    /// Initialise a tapscan configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 tapscan init                       # default location\n\
            \x20 tapscan init --force               # overwrite existing\n\
            \x20 tapscan --config ./tapscan.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 tapscan completions bash > ~/.local/share/bash-completion/completions/tapscan\n\
            \x20 tapscan completions zsh  > ~/.zfunc/_tapscan\n\
            \x20 tapscan completions fish > ~/.config/fish/completions/tapscan.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the tapscan configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 tapscan config get session.focus_region_ratio\n\
            \x20 tapscan config list\n\
            \x20 tapscan config path"
    )]
    Config(ConfigCommands),
}

// ── geometry ──────────────────────────────────────────────────────────────────

/// Control and stream dimensions shared by the geometry commands.
#[derive(Debug, Args)]
pub struct FrameArgs {
    /// Size of the on-screen control hosting the preview.
    #[arg(long = "control", value_name = "WxH", help = "Control size, e.g. 400x300")]
    pub control: Size,

    /// Native resolution of the camera stream.
    #[arg(long = "stream", value_name = "WxH", help = "Stream resolution, e.g. 640x480")]
    pub stream: Size,

    /// Display orientation.  Defaults to `session.initial_orientation`.
    #[arg(
        short = 'o',
        long = "orientation",
        value_name = "ORIENTATION",
        help = "landscape, portrait, landscape-flipped or portrait-flipped"
    )]
    pub orientation: Option<Orientation>,
}

/// Arguments for `tapscan preview-rect`.
#[derive(Debug, Args)]
pub struct PreviewRectArgs {
    #[command(flatten)]
    pub frame: FrameArgs,
}

/// Arguments for `tapscan focus-region`.
#[derive(Debug, Args)]
pub struct FocusRegionArgs {
    /// Tap position in control coordinates.
    #[arg(
        short = 't',
        long = "tap",
        value_name = "X,Y",
        allow_hyphen_values = true,
        help = "Tap position, e.g. 200,150"
    )]
    pub tap: Point,

    #[command(flatten)]
    pub frame: FrameArgs,

    /// Explicit region size, bypassing the ratio.
    #[arg(
        long = "region",
        value_name = "WxH",
        conflicts_with = "ratio",
        help = "Focus region size in control pixels"
    )]
    pub region: Option<Size>,

    /// Region edge as a fraction of the shorter control edge.
    #[arg(
        long = "ratio",
        value_name = "RATIO",
        help = "Region edge ratio in (0, 1]; defaults to session.focus_region_ratio"
    )]
    pub ratio: Option<f64>,
}

// ── simulate ──────────────────────────────────────────────────────────────────

/// Arguments for `tapscan simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Scenario manifest to replay.
    #[arg(value_name = "SCENARIO", help = "Path to a scenario TOML file")]
    pub scenario: PathBuf,

    /// Also print every platform call the session made.
    #[arg(short = 'a', long = "activity", help = "Print the platform activity log")]
    pub activity: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `tapscan init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `tapscan completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `tapscan config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `session.focus_region_ratio`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
