//! Error handling for generated commands

use crate::exit_codes::{EXIT_ERROR, EXIT_WARNING};
use apiloom::{ArgsError, HandlerError};
use std::path::PathBuf;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed or missing arguments
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error("{endpoint}: {source}")]
    Handler {
        endpoint: String,
        #[source]
        source: HandlerError,
    },

    #[error("failed to read body file {}: {source}", path.display())]
    BodyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Clap(#[from] clap::Error),

    #[error("unknown command: {name}")]
    UnknownCommand { name: String },
}

impl CliError {
    /// Exit code for this failure
    ///
    /// Input and usage errors exit with [`EXIT_ERROR`]; failures past
    /// argument parsing exit with [`EXIT_WARNING`].
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Args(_)
            | CliError::BodyFile { .. }
            | CliError::Clap(_)
            | CliError::UnknownCommand { .. } => EXIT_ERROR,
            CliError::Handler { .. }
            | CliError::Output { .. }
            | CliError::Io(_)
            | CliError::Json(_) => EXIT_WARNING,
        }
    }

    /// Whether the failure came from the caller's input
    pub fn is_input_error(&self) -> bool {
        self.exit_code() == EXIT_ERROR
    }
}
