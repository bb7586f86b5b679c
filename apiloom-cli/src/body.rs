//! Resolving request bodies from flags or standard input

use crate::error::{CliError, CliResult};
use apiloom::{ArgsError, Body, BodyConfig, FILE_FLAG, JSON_FLAG};
use clap::ArgMatches;
use is_terminal::IsTerminal;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Where standard input can supply a body from
pub enum StdinSource {
    /// Interactive terminal; never read
    Terminal,
    Piped(Box<dyn Read + Send>),
}

impl StdinSource {
    /// Inspect the process's standard input
    pub fn detect() -> Self {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            StdinSource::Terminal
        } else {
            StdinSource::Piped(Box::new(stdin))
        }
    }

    pub fn piped(reader: impl Read + Send + 'static) -> Self {
        StdinSource::Piped(Box::new(reader))
    }
}

/// Read and decode the body: `--json`, then `--file`, then piped stdin
///
/// A flag given an empty value counts as absent.
pub fn read_body(config: &BodyConfig, matches: &ArgMatches, stdin: StdinSource) -> CliResult<Body> {
    let json = flag_value::<String>(matches, JSON_FLAG).filter(|json| !json.trim().is_empty());
    let file = flag_value::<PathBuf>(matches, FILE_FLAG).filter(|path| !path.as_os_str().is_empty());

    let raw = if let Some(json) = json {
        debug!("Reading body from --{}", JSON_FLAG);
        json.into_bytes()
    } else if let Some(path) = file {
        debug!("Reading body from {}", path.display());
        std::fs::read(&path).map_err(|source| CliError::BodyFile { path, source })?
    } else {
        match stdin {
            StdinSource::Piped(mut reader) => {
                debug!("Reading body from stdin");
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                buffer
            }
            StdinSource::Terminal => Vec::new(),
        }
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(ArgsError::NoBody.into());
    }
    Ok(config.decode(&raw)?)
}

fn flag_value<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}
