//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only ever sees the
//! [`SessionConfig`] section.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `TAPSCAN_SESSION__FOCUS_REGION_RATIO=0.5`
//! 3. Config file (`--config`, else [`AppConfig::config_path`])
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tapscan_core::domain::SessionConfig;

use crate::cli::global::OutputFormat;

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "TAPSCAN";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tunables handed to every scanner session.
    pub session: SessionConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// Used when `--output-format` is left at `auto`.
    pub format: OutputFormat,
}

impl AppConfig {
    /// Load configuration by layering defaults, the config file and the
    /// environment.
    ///
    /// A missing file is not an error: `tapscan init` has to run before the
    /// file exists.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = config_file.cloned().unwrap_or_else(Self::config_path);
        let explicit = config_file.is_some();
        Self::load_from(&path, explicit)
    }

    fn load_from(path: &Path, explicit: bool) -> anyhow::Result<Self> {
        if path.exists() {
            debug!(path = %path.display(), "reading configuration file");
        } else if explicit {
            warn!(path = %path.display(), "configuration file not found, using defaults");
        }

        let defaults = ::config::Config::try_from(&Self::default())
            .context("Failed to seed configuration defaults")?;

        let settings = ::config::Config::builder()
            .add_source(defaults)
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("Configuration has an unexpected shape")?;
        config
            .session
            .validate()
            .context("Invalid session configuration")?;
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.tapscan.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tapscan", "tapscan")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".tapscan.toml"))
    }
}
