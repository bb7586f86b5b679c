//! Error types shared by every surface that invokes an endpoint

use thiserror::Error;

/// Result alias for argument materialization
pub type ArgsResult<T> = Result<T, ArgsError>;

/// User-input errors raised while turning surface input into [`crate::HandlerArgs`]
///
/// These are always recoverable: they abort the current invocation only.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// A required parameter was not supplied
    #[error("missing required argument: {name}")]
    MissingRequired { name: String },

    /// An integer literal could not be parsed
    #[error("invalid integer for {name}: '{value}'")]
    InvalidInt {
        name: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A date literal did not match `YYYY-MM-DD`
    #[error("invalid date for {name}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate {
        name: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A value of the wrong shape was supplied for a parameter
    #[error("invalid argument type for {name}: expected {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    /// More positional tokens were supplied than the endpoint declares
    #[error("unexpected argument: '{value}'")]
    UnexpectedArgument { value: String },

    /// None of the body sources yielded data
    #[error("no body provided: use --json, --file, or pipe JSON on stdin")]
    NoBody,

    /// The body property was absent from a tool call
    #[error("missing required body argument: {property}")]
    MissingBody { property: String },

    /// The body payload was not valid JSON for the declared type
    #[error("invalid {type_name} body: {source}")]
    InvalidBody {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors produced by an endpoint handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The endpoint was registered without a handler
    #[error("endpoint '{endpoint}' has no handler")]
    Missing { endpoint: String },

    /// The wrapped API reported a failure
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The call context was cancelled before the handler finished
    #[error("call cancelled")]
    Cancelled,

    /// Any other failure raised by the handler
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Convenience constructor for upstream API failures
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Other(error.into())
    }
}
