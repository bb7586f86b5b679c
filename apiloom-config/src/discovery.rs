//! Configuration file discovery
//!
//! Files are looked up as `apiloom.{toml,yaml,yml,json}` inside an
//! `.apiloom/` directory, first under the home directory and then under the
//! project directory, so project settings win.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Name of the directory holding configuration files
pub const CONFIG_DIR_NAME: &str = ".apiloom";

/// Base file name of configuration files
pub const CONFIG_FILE_STEM: &str = "apiloom";

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A configuration file found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
}

/// Find configuration files in `dirs`, lowest precedence first
pub fn discover(dirs: &[PathBuf]) -> Vec<ConfigFile> {
    let mut found = Vec::new();
    for dir in dirs {
        found.extend(discover_in(&dir.join(CONFIG_DIR_NAME)));
    }
    found
}

fn discover_in(config_dir: &Path) -> Vec<ConfigFile> {
    ["toml", "yaml", "yml", "json"]
        .iter()
        .filter_map(|ext| {
            let path = config_dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            if !path.is_file() {
                return None;
            }
            trace!("Found config file: {}", path.display());
            ConfigFormat::from_extension(ext).map(|format| ConfigFile { path, format })
        })
        .collect()
}
