//! The surface-neutral argument bag handed to every handler
//!
//! Accessors are deliberately permissive: a missing or mistyped key yields
//! the type's zero value rather than an error, since the CLI, the tool
//! surface and the recorder each supply a different subset of optionals.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    String(String),
    Int(i64),
    Date(DateTime<Utc>),
    Bool(bool),
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::String(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for ArgValue {
    fn from(value: DateTime<Utc>) -> Self {
        ArgValue::Date(value)
    }
}

/// Named arguments in insertion order
pub type ArgMap = IndexMap<String, ArgValue>;

/// A decoded request body of some concrete type
pub struct Body(Box<dyn Any + Send + Sync>);

impl Body {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Borrow the body as `T`, if that is its type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body(..)")
    }
}

/// Arguments for one handler invocation
#[derive(Debug, Default)]
pub struct HandlerArgs {
    params: ArgMap,
    body: Option<Body>,
}

impl HandlerArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: ArgMap) -> Self {
        Self { params, body: None }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Overlay `extra` on the current parameters, replacing existing keys
    pub fn merge(&mut self, extra: ArgMap) {
        self.params.extend(extra);
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.params.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn params(&self) -> &ArgMap {
        &self.params
    }

    /// String value, or `""` when absent or not a string
    pub fn string(&self, key: &str) -> &str {
        match self.params.get(key) {
            Some(ArgValue::String(value)) => value,
            _ => "",
        }
    }

    /// Integer value, or `0` when absent or not an integer
    pub fn int(&self, key: &str) -> i64 {
        self.int_or(key, 0)
    }

    /// Integer value, or `default` when absent or not an integer
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        match self.params.get(key) {
            Some(ArgValue::Int(value)) => *value,
            _ => default,
        }
    }

    /// Boolean value, or `false` when absent or not a boolean
    pub fn bool(&self, key: &str) -> bool {
        matches!(self.params.get(key), Some(ArgValue::Bool(true)))
    }

    /// Date value, or the current time when absent or not a date
    pub fn date(&self, key: &str) -> DateTime<Utc> {
        self.date_opt(key).unwrap_or_else(Utc::now)
    }

    /// Date value if one was supplied
    ///
    /// Date ranges leave `start`/`end` unset when a bound is omitted, so
    /// handlers that need to tell "absent" from "now" read them through here.
    pub fn date_opt(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.params.get(key) {
            Some(ArgValue::Date(value)) => Some(*value),
            _ => None,
        }
    }

    /// The decoded body as `T`, if a body of that type was supplied
    pub fn body<T: Any>(&self) -> Option<&T> {
        self.body.as_ref().and_then(|body| body.downcast_ref::<T>())
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
