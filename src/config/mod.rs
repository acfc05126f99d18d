pub mod path;

#[cfg(test)]
pub mod config_test;

use std::{io, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bus::registry::ChildRegistry, usb::Family};

/// Represents all possible errors loading a [BusConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Identity overrides for one controller family
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct FamilyConfig {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

/// Configuration of the virtual gamepad bus
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct BusConfig {
    pub version: u32,
    pub kind: String,
    pub name: String,
    /// Maximum number of children that can be plugged in at the same time
    pub max_children: Option<usize>,
    pub xusb: Option<FamilyConfig>,
    pub ds4: Option<FamilyConfig>,
    pub xgip: Option<FamilyConfig>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            version: 1,
            kind: "BusConfig".to_string(),
            name: "padbus".to_string(),
            max_children: None,
            xusb: None,
            ds4: None,
            xgip: None,
        }
    }
}

impl BusConfig {
    /// Load a [BusConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<BusConfig, LoadError> {
        let config: BusConfig = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [BusConfig] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<BusConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: BusConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the first config file found in the config search paths. Falls
    /// back to the default config if no file exists.
    pub fn load() -> Result<BusConfig, LoadError> {
        for path in path::get_config_paths() {
            if !path.exists() {
                log::trace!("No config at {path:?}");
                continue;
            }
            log::info!("Loading bus config from {path:?}");
            return BusConfig::from_yaml_file(path);
        }
        log::info!("No bus config found. Using defaults.");
        Ok(BusConfig::default())
    }

    /// Returns the identity overrides of the given family
    pub fn family(&self, family: Family) -> Option<&FamilyConfig> {
        match family {
            Family::Xusb => self.xusb.as_ref(),
            Family::Ds4 => self.ds4.as_ref(),
            Family::Xgip => self.xgip.as_ref(),
        }
    }

    /// Create a child registry configured with the limits and identity
    /// overrides of this config
    pub fn registry(&self) -> ChildRegistry {
        let mut registry = ChildRegistry::new(self.max_children);
        for family in Family::all() {
            let Some(overrides) = self.family(family) else {
                continue;
            };
            let (vendor_id, product_id) = family.default_ids();
            registry.set_default_ids(
                family,
                overrides.vendor_id.unwrap_or(vendor_id),
                overrides.product_id.unwrap_or(product_id),
            );
        }
        registry
    }
}
