//! # Apiloom
//!
//! A declarative endpoint framework. One [`Endpoint`] declaration describes
//! an operation of a wrapped web API, and independent consumers project it:
//!
//! - `apiloom-cli` turns the [`Registry`] into clap commands
//! - `apiloom-tools` turns it into MCP tool schemas and handlers
//! - `apiloom-recorder` replays it, in dependency order, to capture fixtures
//!
//! This crate holds the shared vocabulary: parameters and their types, the
//! argument bag handed to handlers, body configuration, the registry, the
//! parameter materialization rules every surface follows, and the metadata
//! linter.

pub mod args;
pub mod body;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod materialize;
pub mod param;
pub mod parse;
pub mod registry;
pub mod validate;

pub use args::{ArgMap, ArgValue, Body, HandlerArgs};
pub use body::BodyConfig;
pub use context::{CallContext, Surface};
pub use endpoint::{
    ArgProvider, Endpoint, EndpointBuilder, Handler, HandlerFuture, HandlerOutput, Method,
    FILE_FLAG, HELP_FLAG, JSON_FLAG, OUTPUT_FLAG,
};
pub use error::{ArgsError, ArgsResult, HandlerError};
pub use materialize::{materialize, ArgSource, RawArg};
pub use param::{Param, ParamType, END_KEY, START_KEY};
pub use registry::{is_recorded, Registry, NO_CASSETTE};
pub use validate::validate;
