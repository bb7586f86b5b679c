//! Configuration values

use crate::error::ConfigError;
use crate::ConfigResult;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory holding cassette fixtures
pub const DEFAULT_CASSETTE_DIR: &str = "testdata/cassettes";

/// Settings shared by the generated CLI and the fixture recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoomConfig {
    /// Directory holding `<cassette>.yaml` fixtures
    pub cassette_dir: PathBuf,

    /// Date the recorder synthesizes date arguments from; today when unset
    pub reference_date: Option<NaiveDate>,

    /// Opaque session blob handed to the client builder while recording
    pub session_file: Option<PathBuf>,
}

impl Default for LoomConfig {
    fn default() -> Self {
        Self {
            cassette_dir: PathBuf::from(DEFAULT_CASSETTE_DIR),
            reference_date: None,
            session_file: None,
        }
    }
}

impl LoomConfig {
    /// The reference date at midnight UTC
    pub fn reference_datetime(&self) -> DateTime<Utc> {
        let date = self
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive());
        date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Read the session blob, empty when no session file is configured
    pub fn read_session(&self) -> ConfigResult<Vec<u8>> {
        match &self.session_file {
            Some(path) => std::fs::read(path).map_err(|source| ConfigError::SessionRead {
                path: path.clone(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }
}
