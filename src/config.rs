use crate::consts::{
    DEFAULT_MAX_ADVANCED_KEYS, DEFAULT_MAX_KEYS, DEFAULT_MAX_LAYERS, DEFAULT_MAX_PROFILES,
    PARAM_SLOTS,
};
use crate::error::{KeymetaError, KmResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Firmware capacity limits bounding the count fields of a metadata document.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FirmwareLimits {
    #[arg(long, default_value_t = DEFAULT_MAX_PROFILES)]
    pub max_profiles: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_LAYERS)]
    pub max_layers: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_KEYS)]
    pub max_keys: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_ADVANCED_KEYS)]
    pub max_advanced_keys: usize,
}

impl Default for FirmwareLimits {
    fn default() -> Self {
        Self {
            max_profiles: DEFAULT_MAX_PROFILES,
            max_layers: DEFAULT_MAX_LAYERS,
            max_keys: DEFAULT_MAX_KEYS,
            max_advanced_keys: DEFAULT_MAX_ADVANCED_KEYS,
        }
    }
}

impl FirmwareLimits {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KmResult<Self> {
        let content = fs::read_to_string(&path).map_err(|source| KeymetaError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let limits: Self = serde_json::from_str(&content)?;
        limits.validate()?;
        Ok(limits)
    }

    /// Profiles and layers must stay addressable by `PF(n)` / `MO(n)`, and key
    /// indices are bytes.
    pub fn validate(&self) -> KmResult<()> {
        let slots = PARAM_SLOTS as usize;
        let checks = [
            ("maxProfiles", self.max_profiles, slots),
            ("maxLayers", self.max_layers, slots),
            ("maxKeys", self.max_keys, DEFAULT_MAX_KEYS),
            ("maxAdvancedKeys", self.max_advanced_keys, u16::MAX as usize),
        ];
        for (name, value, ceiling) in checks {
            if value == 0 || value > ceiling {
                return Err(KeymetaError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, ceiling, value
                )));
            }
        }
        Ok(())
    }

    /// Copies values the user typed on the command line over the loaded ones.
    pub fn merge_from_cli(&mut self, cli_limits: &FirmwareLimits, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$field = cli_limits.$field;
                }
            };
        }

        update_if_present!(max_profiles);
        update_if_present!(max_layers);
        update_if_present!(max_keys);
        update_if_present!(max_advanced_keys);
    }
}
