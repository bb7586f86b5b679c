//! Parameter declarations shared by every generated surface

use serde::{Deserialize, Serialize};
use std::fmt;

/// Argument key a [`ParamType::DateRange`] stores its lower bound under
pub const START_KEY: &str = "start";

/// Argument key a [`ParamType::DateRange`] stores its upper bound under
pub const END_KEY: &str = "end";

/// The closed set of parameter types every surface understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Free text
    String,
    /// Base-10 integer
    Int,
    /// Calendar day written as `YYYY-MM-DD`, defaulting to now
    Date,
    /// Pair of optional `start`/`end` dates, always flag-only
    DateRange,
    /// Boolean switch, default false
    Bool,
}

impl ParamType {
    /// Get the string representation of this parameter type
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::Date => "date",
            ParamType::DateRange => "date_range",
            ParamType::Bool => "bool",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// The parameter name, used as the argument key and the flag/property name
    pub name: String,

    /// The type of value expected
    pub kind: ParamType,

    /// Whether the parameter must be supplied
    pub required: bool,

    /// Human-readable description shown in help text and tool schemas
    pub description: String,
}

impl Param {
    /// Create a new optional parameter
    pub fn new(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn int(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Int, description)
    }

    pub fn date(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Date, description)
    }

    /// A date range; its values always land under [`START_KEY`] and [`END_KEY`]
    pub fn date_range(description: impl Into<String>) -> Self {
        Self::new("range", ParamType::DateRange, description)
    }

    pub fn bool(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Bool, description)
    }

    /// Mark the parameter as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether the CLI consumes this parameter from positional tokens
    ///
    /// Required strings and integers are positional, and so is every date.
    pub fn is_positional(&self) -> bool {
        match self.kind {
            ParamType::String | ParamType::Int => self.required,
            ParamType::Date => true,
            ParamType::DateRange | ParamType::Bool => false,
        }
    }
}
