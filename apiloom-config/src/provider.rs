//! Configuration provider using Figment for Apiloom

use crate::{
    discovery::{discover, ConfigFile, ConfigFormat},
    error::ConfigError,
    types::LoomConfig,
    ConfigResult,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Prefix for environment variable overrides, e.g. `APILOOM_CASSETTE_DIR`
pub const ENV_PREFIX: &str = "APILOOM_";

/// Configuration provider using figment
///
/// Sources are merged in precedence order (later sources override earlier ones):
/// 1. Default values
/// 2. `~/.apiloom/apiloom.*`
/// 3. `<project>/.apiloom/apiloom.*`
/// 4. `APILOOM_*` environment variables
///
/// Nothing is cached; every [`ConfigProvider::load`] reads the sources again.
pub struct ConfigProvider {
    search_dirs: Vec<PathBuf>,
}

impl ConfigProvider {
    /// Search the home directory and the current directory
    pub fn new() -> Self {
        let mut search_dirs = Vec::new();
        if let Some(home) = dirs::home_dir() {
            search_dirs.push(home);
        }
        if let Ok(current) = std::env::current_dir() {
            if !search_dirs.contains(&current) {
                search_dirs.push(current);
            }
        }
        Self { search_dirs }
    }

    /// Search only `project_dir`
    pub fn for_dir(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dirs: vec![project_dir.into()],
        }
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<LoomConfig> {
        let config: LoomConfig = self.build_figment().extract()?;

        if config.cassette_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "cassette_dir".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        debug!(
            "Loaded configuration: cassette_dir={}, reference_date={:?}",
            config.cassette_dir.display(),
            config.reference_date
        );
        Ok(config)
    }

    fn build_figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(LoomConfig::default()));

        for config_file in discover(&self.search_dirs) {
            trace!(
                "Loading config file: {} ({:?})",
                config_file.path.display(),
                config_file.format
            );
            figment = figment.merge(Self::file_provider(&config_file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn file_provider(config_file: &ConfigFile) -> Figment {
        let path = &config_file.path;
        match config_file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}
