use std::path::Path;

use amp_pack::PackConfig;
use amp_store::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

/// Plugin configuration, usually read from TOML.
///
/// ```toml
/// [store]
/// endpoint = "file:///var/lib/amp/docs"
/// timeout_ms = 10000
/// max_in_flight = 16
///
/// [pack]
/// temp_prefix = "amp-pkg-"
/// default_mode = 420
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub store: StoreConfig,
    pub pack: PackConfig,
}

impl PluginConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> PluginResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> PluginResult<Self> {
        toml::from_str(text).map_err(|e| PluginError::Config(e.to_string()))
    }

    /// Replace the store endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.store.endpoint = endpoint.into();
        self
    }
}
