use crate::domain::errors::{ExtractorError, Result};
use crate::domain::settings::Settings;
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Loads settings from `path`, layering the file over the built-in defaults.
///
/// A missing file is created with the defaults. A malformed file is reported
/// and the defaults are used instead; neither case is an error.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        info!("No settings file at {}, creating defaults", path.display());
        let settings = Settings::default();
        if let Err(e) = save_settings(path, &settings) {
            warn!("Could not create default settings file: {}", e);
        }
        return settings;
    }

    match read_settings(path) {
        Ok(settings) => {
            debug!("Loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            warn!("{}; falling back to defaults", e);
            Settings::default()
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path)?;
    let config_error = |source| ExtractorError::Config {
        path: path.to_path_buf(),
        source,
    };

    let overrides: Value = serde_json::from_str(&text).map_err(config_error)?;
    let mut merged = serde_json::to_value(Settings::default()).map_err(config_error)?;
    deep_merge(&mut merged, overrides);
    serde_json::from_value(merged).map_err(config_error)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings).map_err(|source| ExtractorError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ExtractorError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created default settings file at: {}", path.display());
    Ok(())
}

/// Recursively overlays `overrides` onto `base`. Objects merge key by key;
/// any other value replaces what was there.
pub fn deep_merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
