//! Recorder errors

use thiserror::Error;

/// Result type for recording operations
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Structural failures of a recording pass
///
/// Handler failures are not errors here: they are logged and reported in
/// [`crate::RecordReport::failed`] while recording continues.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// No endpoint is recorded under the requested cassette
    #[error("cassette not found: {name}")]
    CassetteNotFound { name: String },

    /// The transport for a cassette could not be opened or closed
    #[error("transport failure for cassette {cassette}: {source}")]
    Transport {
        cassette: String,
        #[source]
        source: anyhow::Error,
    },

    /// The domain client could not be built from the transport
    #[error("failed to build client for cassette {cassette}: {source}")]
    ClientBuild {
        cassette: String,
        #[source]
        source: anyhow::Error,
    },

    /// Recorder settings could not be loaded
    #[error(transparent)]
    Config(#[from] apiloom_config::ConfigError),
}
