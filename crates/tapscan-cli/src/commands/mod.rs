//! One module per subcommand; each exposes an `execute` entry point.

pub mod completions;
pub mod config;
pub mod focus_region;
pub mod init;
pub mod preview_rect;
pub mod simulate;
