//! Apiloom configuration management using Figment
//!
//! Settings for the generated CLI and the fixture recorder are read from
//! `.apiloom/apiloom.{toml,yaml,yml,json}` files and `APILOOM_*` environment
//! variables.
//!
//! ```no_run
//! use apiloom_config::load_configuration;
//!
//! let config = load_configuration()?;
//! println!("cassettes live in {}", config.cassette_dir.display());
//! # Ok::<(), apiloom_config::ConfigError>(())
//! ```
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! cassette_dir = "testdata/cassettes"
//! reference_date = "2024-03-01"
//! session_file = ".apiloom/session.json"
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use error::ConfigError;
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{LoomConfig, DEFAULT_CASSETTE_DIR};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load configuration from the home and current directories plus environment
pub fn load_configuration() -> ConfigResult<LoomConfig> {
    ConfigProvider::new().load()
}
