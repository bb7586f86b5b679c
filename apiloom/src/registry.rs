//! Endpoint registry
//!
//! The registry is built once at process start and read-only afterwards.
//! Registration order is preserved so command listings, tool listings and
//! recording passes are deterministic.

use crate::endpoint::Endpoint;
use std::collections::HashMap;
use tracing::debug;

/// Cassette label for endpoints that are deliberately never recorded
pub const NO_CASSETTE: &str = "none";

/// Ordered collection of endpoints, queryable by name
pub struct Registry<C> {
    endpoints: Vec<Endpoint<C>>,
    index: HashMap<String, usize>,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append an endpoint
    ///
    /// Nothing is rejected here. A duplicate name stays in [`Registry::all`]
    /// and takes over the name lookup; the linter reports it.
    pub fn register(&mut self, endpoint: Endpoint<C>) {
        debug!("Registering endpoint: {}", endpoint.name);
        self.index.insert(endpoint.name.clone(), self.endpoints.len());
        self.endpoints.push(endpoint);
    }

    pub fn by_name(&self, name: &str) -> Option<&Endpoint<C>> {
        self.index.get(name).map(|&i| &self.endpoints[i])
    }

    /// Every endpoint in registration order
    pub fn all(&self) -> &[Endpoint<C>] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Recordable cassette labels in first-seen order
    ///
    /// Empty labels and [`NO_CASSETTE`] are never recorded.
    pub fn cassettes(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for endpoint in &self.endpoints {
            let label = endpoint.cassette.as_str();
            if is_recorded(label) && !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Endpoints recorded under `cassette`, in registration order
    pub fn by_cassette(&self, cassette: &str) -> Vec<&Endpoint<C>> {
        if !is_recorded(cassette) {
            return Vec::new();
        }
        self.endpoints
            .iter()
            .filter(|e| e.cassette == cassette)
            .collect()
    }
}

/// Whether endpoints under this cassette label take part in recording
///
/// Besides the empty label, [`NO_CASSETTE`] opts an endpoint out: it marks
/// calls with side effects that must never be replayed against the API.
pub fn is_recorded(cassette: &str) -> bool {
    !cassette.is_empty() && cassette != NO_CASSETTE
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FromIterator<Endpoint<C>> for Registry<C> {
    fn from_iter<I: IntoIterator<Item = Endpoint<C>>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for endpoint in iter {
            registry.register(endpoint);
        }
        registry
    }
}
