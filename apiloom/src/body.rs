//! Structured JSON request bodies

use crate::args::Body;
use crate::error::{ArgsError, ArgsResult};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

type BodyDecoder = Arc<dyn Fn(&[u8]) -> Result<Body, serde_json::Error> + Send + Sync>;

/// Fallback property name for bodies whose type carries no name
pub const ANONYMOUS_BODY_PROPERTY: &str = "body";

/// Describes the JSON body an endpoint accepts
///
/// The decoder is bound to a concrete type when the config is created, so
/// surfaces can turn raw JSON into a typed [`Body`] without knowing the type.
#[derive(Clone)]
pub struct BodyConfig {
    type_name: Option<String>,
    description: String,
    example: Option<String>,
    decoder: BodyDecoder,
}

impl BodyConfig {
    /// A body decoded into `T`, named after the type
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            type_name: Some(short_type_name(std::any::type_name::<T>())),
            description: String::new(),
            example: None,
            decoder: Arc::new(|raw| serde_json::from_slice::<T>(raw).map(Body::new)),
        }
    }

    /// An anonymous body kept as a [`serde_json::Value`]
    pub fn json() -> Self {
        Self {
            type_name: None,
            description: String::new(),
            example: None,
            decoder: Arc::new(|raw| serde_json::from_slice::<serde_json::Value>(raw).map(Body::new)),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Tool property name: the type name with its first character lower-cased
    pub fn property_name(&self) -> String {
        match self.type_name.as_deref() {
            Some(name) if !name.is_empty() => lower_first(name),
            _ => ANONYMOUS_BODY_PROPERTY.to_string(),
        }
    }

    /// Decode a raw JSON payload into the bound type
    pub fn decode(&self, raw: &[u8]) -> ArgsResult<Body> {
        (self.decoder)(raw).map_err(|source| ArgsError::InvalidBody {
            type_name: self
                .type_name
                .clone()
                .unwrap_or_else(|| "JSON".to_string()),
            source,
        })
    }
}

impl fmt::Debug for BodyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyConfig")
            .field("type_name", &self.type_name)
            .field("description", &self.description)
            .field("example", &self.example)
            .finish_non_exhaustive()
    }
}

/// `my_crate::models::NewWorkout` becomes `NewWorkout`; generics are dropped
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
