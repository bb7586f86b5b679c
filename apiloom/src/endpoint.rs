//! Endpoint declarations
//!
//! An [`Endpoint`] is one operation of the wrapped API: its identity,
//! transport metadata, parameters, optional body, dependency link, the
//! bindings for each generated surface, and the handler that performs the call.
//!
//! ```rust,ignore
//! let endpoint = Endpoint::builder("get_workout")
//!     .service("workouts")
//!     .cassette("workouts")
//!     .get("/v1/workouts/{id}")
//!     .param(Param::int("id", "Workout id").required())
//!     .cli("workouts", Some("get"))
//!     .tool("get_workout")
//!     .short("Show one workout")
//!     .handler(|_ctx, client: Arc<Client>, args| async move {
//!         HandlerOutput::json(&client.workout(args.int("id")).await?)
//!     })
//!     .build();
//! ```

use crate::args::{ArgMap, HandlerArgs};
use crate::body::BodyConfig;
use crate::context::CallContext;
use crate::error::HandlerError;
use crate::param::{Param, ParamType, END_KEY, START_KEY};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

/// Command-line flag carrying a literal JSON body
pub const JSON_FLAG: &str = "json";

/// Command-line flag naming a body file
pub const FILE_FLAG: &str = "file";

/// Command-line flag naming the destination of raw output
pub const OUTPUT_FLAG: &str = "output";

/// Help flag every generated command carries
pub const HELP_FLAG: &str = "help";

/// HTTP verbs an endpoint may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb normally carry a body
    pub fn expects_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

/// What a handler produced
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// JSON-serializable data
    Json(Value),
    /// Opaque bytes, written verbatim by the CLI
    Raw(Bytes),
}

impl HandlerOutput {
    /// Serialize any value into a JSON output
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self::Raw(bytes.into())
    }

    /// The JSON value, or `None` for raw output
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Future returned by a handler
pub type HandlerFuture = BoxFuture<'static, Result<HandlerOutput, HandlerError>>;

/// Performs the actual API call for an endpoint
pub type Handler<C> = Arc<dyn Fn(CallContext, Arc<C>, HandlerArgs) -> HandlerFuture + Send + Sync>;

/// Derives extra arguments from an upstream endpoint's result
///
/// Returning `None` means the upstream produced nothing usable and the
/// dependent should be skipped for this run.
pub type ArgProvider = Arc<dyn Fn(&Value) -> Option<ArgMap> + Send + Sync>;

/// One declared operation of the wrapped API
pub struct Endpoint<C> {
    pub name: String,
    /// Grouping label for documentation
    pub service: String,
    /// Fixture group; empty means never recorded
    pub cassette: String,

    pub path: String,
    pub method: Method,

    pub params: Vec<Param>,
    pub body: Option<BodyConfig>,

    /// Name of the endpoint whose result feeds this one during recording
    pub depends_on: Option<String>,
    pub arg_provider: Option<ArgProvider>,

    pub cli_command: Option<String>,
    pub cli_subcommand: Option<String>,
    pub cli_aliases: Vec<String>,

    pub tool_name: Option<String>,

    pub short: String,
    pub long: String,

    /// The handler returns [`HandlerOutput::Raw`] bytes
    pub raw_output: bool,

    pub handler: Option<Handler<C>>,
}

impl<C> Endpoint<C> {
    pub fn builder(name: impl Into<String>) -> EndpointBuilder<C> {
        EndpointBuilder::new(name)
    }

    /// Invoke the handler, failing if none was registered
    ///
    /// A context that is already cancelled never reaches the handler.
    pub async fn invoke(
        &self,
        ctx: CallContext,
        client: Arc<C>,
        args: HandlerArgs,
    ) -> Result<HandlerOutput, HandlerError> {
        if ctx.is_cancelled() {
            return Err(HandlerError::Cancelled);
        }
        match &self.handler {
            Some(handler) => handler(ctx, client, args).await,
            None => Err(HandlerError::Missing {
                endpoint: self.name.clone(),
            }),
        }
    }

    /// Whether any declared parameter is a date range
    pub fn has_date_range(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamType::DateRange)
    }

    /// Names this endpoint's parameters cannot take
    ///
    /// These are the flags generated alongside the parameters and the keys
    /// a date range writes its bounds under.
    pub fn reserved_names(&self) -> Vec<&'static str> {
        let mut names = vec![HELP_FLAG];
        if self.has_date_range() {
            names.extend([START_KEY, END_KEY]);
        }
        if self.body.is_some() {
            names.extend([JSON_FLAG, FILE_FLAG]);
        }
        if self.raw_output {
            names.push(OUTPUT_FLAG);
        }
        names
    }
}

impl<C> Clone for Endpoint<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            service: self.service.clone(),
            cassette: self.cassette.clone(),
            path: self.path.clone(),
            method: self.method,
            params: self.params.clone(),
            body: self.body.clone(),
            depends_on: self.depends_on.clone(),
            arg_provider: self.arg_provider.clone(),
            cli_command: self.cli_command.clone(),
            cli_subcommand: self.cli_subcommand.clone(),
            cli_aliases: self.cli_aliases.clone(),
            tool_name: self.tool_name.clone(),
            short: self.short.clone(),
            long: self.long.clone(),
            raw_output: self.raw_output,
            handler: self.handler.clone(),
        }
    }
}

impl<C> fmt::Debug for Endpoint<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("service", &self.service)
            .field("cassette", &self.cassette)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("body", &self.body)
            .field("depends_on", &self.depends_on)
            .field("cli_command", &self.cli_command)
            .field("cli_subcommand", &self.cli_subcommand)
            .field("tool_name", &self.tool_name)
            .field("raw_output", &self.raw_output)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Endpoint`]
pub struct EndpointBuilder<C> {
    endpoint: Endpoint<C>,
}

impl<C> EndpointBuilder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint {
                name: name.into(),
                service: String::new(),
                cassette: String::new(),
                path: String::new(),
                method: Method::Get,
                params: Vec::new(),
                body: None,
                depends_on: None,
                arg_provider: None,
                cli_command: None,
                cli_subcommand: None,
                cli_aliases: Vec::new(),
                tool_name: None,
                short: String::new(),
                long: String::new(),
                raw_output: false,
                handler: None,
            },
        }
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.endpoint.service = service.into();
        self
    }

    pub fn cassette(mut self, cassette: impl Into<String>) -> Self {
        self.endpoint.cassette = cassette.into();
        self
    }

    pub fn route(mut self, method: Method, path: impl Into<String>) -> Self {
        self.endpoint.method = method;
        self.endpoint.path = path.into();
        self
    }

    pub fn get(self, path: impl Into<String>) -> Self {
        self.route(Method::Get, path)
    }

    pub fn post(self, path: impl Into<String>) -> Self {
        self.route(Method::Post, path)
    }

    pub fn put(self, path: impl Into<String>) -> Self {
        self.route(Method::Put, path)
    }

    pub fn delete(self, path: impl Into<String>) -> Self {
        self.route(Method::Delete, path)
    }

    pub fn param(mut self, param: Param) -> Self {
        self.endpoint.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.endpoint.params.extend(params);
        self
    }

    pub fn body(mut self, body: BodyConfig) -> Self {
        self.endpoint.body = Some(body);
        self
    }

    /// Feed this endpoint from `upstream`'s result during recording
    pub fn depends_on<F>(mut self, upstream: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&Value) -> Option<ArgMap> + Send + Sync + 'static,
    {
        self.endpoint.depends_on = Some(upstream.into());
        self.endpoint.arg_provider = Some(Arc::new(provider));
        self
    }

    /// Bind the endpoint to a CLI command, optionally nested under a group
    pub fn cli(mut self, command: impl Into<String>, subcommand: Option<&str>) -> Self {
        self.endpoint.cli_command = Some(command.into());
        self.endpoint.cli_subcommand = subcommand.map(str::to_string);
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoint.cli_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.endpoint.tool_name = Some(name.into());
        self
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.endpoint.short = short.into();
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.endpoint.long = long.into();
        self
    }

    pub fn raw_output(mut self) -> Self {
        self.endpoint.raw_output = true;
        self
    }

    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(CallContext, Arc<C>, HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerOutput, HandlerError>> + Send + 'static,
    {
        self.endpoint.handler = Some(Arc::new(move |ctx, client, args| {
            handler(ctx, client, args).boxed()
        }));
        self
    }

    pub fn build(self) -> Endpoint<C> {
        self.endpoint
    }
}
