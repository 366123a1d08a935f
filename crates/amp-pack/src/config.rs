use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMP_PREFIX: &str = "amp-pkg-";

/// rw-r--r--
pub const DEFAULT_MODE: u32 = 0o644;

/// Settings for the `[pack]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Prefix for the temp directory each fetch creates.
    pub temp_prefix: String,
    /// Mode for files whose document records no permissions.
    pub default_mode: u32,
    /// Parent for temp directories; the system temp dir when unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            default_mode: DEFAULT_MODE,
            temp_root: None,
        }
    }
}

impl PackConfig {
    pub(crate) fn tempdir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.temp_prefix);
        match &self.temp_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
    }
}
