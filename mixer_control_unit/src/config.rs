//! Control-unit configuration loading.
//!
//! Parses a `MixerConfig` from TOML and runs all validation rules. Missing
//! sections take the buffered absolute-position defaults.

use std::path::Path;

use mixer_common::config::{ConfigError, ConfigLoader};
use mixer_common::control_unit::config::{MixerConfig, Variant};
use tracing::info;

/// Load and validate the control-unit configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MixerConfig, ConfigError> {
    let config = MixerConfig::load(path)?;
    config.validate()?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<MixerConfig, ConfigError> {
    let config = MixerConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}

/// Pick the effective configuration.
///
/// An explicit file wins, then an explicit preset, then `default_path` if it
/// exists, then the buffered absolute-position preset.
pub fn resolve_config(
    explicit: Option<&Path>,
    preset: Option<Variant>,
    default_path: &Path,
) -> Result<MixerConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    if preset.is_none() && default_path.is_file() {
        return load_config(default_path);
    }
    let variant = preset.unwrap_or(Variant::AbsoluteWithBuffer);
    let config = MixerConfig::preset(variant);
    config.validate()?;
    info!(?variant, "using built-in preset");
    Ok(config)
}
