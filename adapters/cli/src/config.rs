//! Balance profile loading.
//!
//! A TOML file only needs to name the values it changes; everything else is
//! inherited from the selected preset. TOML has no null, so
//! `tower.max_level = 0` stands for "no level cap".

use std::{fs, io, path::Path};

use clap::ValueEnum;
use path_defence_core::{BalanceError, BalanceProfile};
use serde_json::Value;
use thiserror::Error;

/// Built-in balance presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Preset {
    /// Straight lane, furthest-progress targeting, level cap of three.
    Straight,
    /// Winding lane, nearest-to-tower targeting, no level cap.
    Winding,
}

impl Preset {
    pub(crate) fn profile(self) -> BalanceProfile {
        match self {
            Self::Straight => BalanceProfile::straight_lane(),
            Self::Winding => BalanceProfile::winding_lane(),
        }
    }
}

/// Failures while loading a balance profile.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file")]
    Io(#[from] io::Error),
    /// The file is not valid TOML.
    #[error("failed to parse configuration file")]
    Parse(#[from] toml::de::Error),
    /// A value has the wrong type for its field.
    #[error("configuration values do not fit the balance profile")]
    Shape(#[from] serde_json::Error),
    /// The merged profile failed validation.
    #[error("invalid balance profile: {0}")]
    Invalid(#[from] BalanceError),
}

/// Resolves the profile for a preset, optionally overridden by a TOML file.
pub(crate) fn load(preset: Preset, path: Option<&Path>) -> Result<BalanceProfile, ConfigError> {
    let profile = match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            layer(preset.profile(), &text)?
        }
        None => preset.profile(),
    };
    profile.validate()?;
    Ok(profile)
}

/// Overlays the values present in `text` onto `base`.
pub(crate) fn layer(base: BalanceProfile, text: &str) -> Result<BalanceProfile, ConfigError> {
    let overrides: toml::Table = toml::from_str(text)?;
    let mut merged = serde_json::to_value(base)?;
    merge(&mut merged, serde_json::to_value(overrides)?);
    let mut profile: BalanceProfile = serde_json::from_value(merged)?;
    if profile.tower.max_level == Some(0) {
        profile.tower.max_level = None;
    }
    Ok(profile)
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        let _ = base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
