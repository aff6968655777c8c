//! `tapscan config` — inspect configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult, config_error},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            match output.format() {
                OutputFormat::Json => output.json(&serde_json::json!({ key: value }))?,
                _ => output.print(&format!("{key} = {value}"))?,
            }
        }

        ConfigCommands::List => match output.format() {
            OutputFormat::Json => output.json(&config)?,
            _ => {
                output.header("Current Configuration:")?;
                let serialised = toml::to_string_pretty(&config)
                    .map_err(|e| config_error(format!("Failed to serialise config: {e}"), e))?;
                output.print(&serialised)?;
            }
        },

        ConfigCommands::Path => {
            let path = global.config.unwrap_or_else(AppConfig::config_path);
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let session = &config.session;
    match key {
        "session.focus_region_ratio" => Ok(session.focus_region_ratio.to_string()),
        "session.apply_white_balance" => Ok(session.apply_white_balance.to_string()),
        "session.apply_stabilization" => Ok(session.apply_stabilization.to_string()),
        "session.initial_orientation" => Ok(session.initial_orientation.to_string()),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.format" => Ok(config.output.format.to_string()),
        _ => Err(CliError::UnknownConfigKey {
            key: key.to_string(),
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CONFIG_KEYS;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(
            get_config_value(&cfg, "session.focus_region_ratio").unwrap(),
            "0.25"
        );
        assert_eq!(
            get_config_value(&cfg, "session.initial_orientation").unwrap(),
            "landscape"
        );
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::UnknownConfigKey { .. })
        ));
    }

    #[test]
    fn every_advertised_key_resolves() {
        let cfg = AppConfig::default();
        for key in CONFIG_KEYS {
            assert!(get_config_value(&cfg, key).is_ok(), "{key}");
        }
    }
}
