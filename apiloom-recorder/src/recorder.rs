//! The recording pass

use crate::defaults::default_args;
use crate::error::{RecorderError, RecorderResult};
use crate::order::order_by_dependency;
use crate::transport::{Cassette, CassetteFactory, ClientBuilder, Session};
use apiloom::{CallContext, Endpoint, HandlerArgs, Registry};
use apiloom_config::LoomConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of recording one cassette
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    pub cassette: String,
    /// Endpoints whose handler succeeded, in execution order
    pub recorded: Vec<String>,
    /// Dependents whose arg provider produced nothing
    pub skipped: Vec<String>,
    /// Endpoints whose handler returned an error
    pub failed: Vec<String>,
}

impl RecordReport {
    fn new(cassette: &str) -> Self {
        Self {
            cassette: cassette.to_string(),
            ..Default::default()
        }
    }
}

/// Drives every recordable endpoint through a cassette transport
pub struct Recorder<'a, C, F: CassetteFactory> {
    registry: &'a Registry<C>,
    factory: F,
    build_client: ClientBuilder<F::Http, C>,
    session: Session,
    reference: DateTime<Utc>,
}

impl<'a, C, F: CassetteFactory> Recorder<'a, C, F> {
    /// Create a recorder with an empty session and today as reference date
    pub fn new<B>(registry: &'a Registry<C>, factory: F, build_client: B) -> Self
    where
        B: Fn(F::Http, &Session) -> anyhow::Result<C> + Send + Sync + 'static,
    {
        Self {
            registry,
            factory,
            build_client: Arc::new(build_client),
            session: Session::default(),
            reference: LoomConfig::default().reference_datetime(),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Date that synthesized date arguments are derived from
    pub fn with_reference(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = reference;
        self
    }

    /// Apply the reference date and session file from loaded settings
    pub fn with_config(self, config: &LoomConfig) -> RecorderResult<Self> {
        let session = Session::new(config.read_session()?);
        Ok(self
            .with_reference(config.reference_datetime())
            .with_session(session))
    }

    /// Record every cassette in first-seen order
    ///
    /// Stops at the first cassette whose transport or client fails.
    pub async fn record_all(&self, ctx: &CallContext) -> RecorderResult<Vec<RecordReport>> {
        let mut reports = Vec::new();
        for cassette in self.registry.cassettes() {
            reports.push(self.record_cassette(ctx, cassette).await?);
        }
        Ok(reports)
    }

    /// Record the endpoints filed under one cassette
    ///
    /// The empty label and [`NO_CASSETTE`](apiloom::NO_CASSETTE) mark
    /// endpoints that are never recorded, so both fail with
    /// [`RecorderError::CassetteNotFound`] like an unknown name.
    pub async fn record_cassette(
        &self,
        ctx: &CallContext,
        cassette: &str,
    ) -> RecorderResult<RecordReport> {
        let endpoints = self.registry.by_cassette(cassette);
        if endpoints.is_empty() {
            return Err(RecorderError::CassetteNotFound {
                name: cassette.to_string(),
            });
        }

        info!("Recording cassette {} ({} endpoints)", cassette, endpoints.len());
        let mut handle = self
            .factory
            .open(cassette)
            .await
            .map_err(|source| RecorderError::Transport {
                cassette: cassette.to_string(),
                source,
            })?;

        let client = match (self.build_client)(handle.http_client(), &self.session) {
            Ok(client) => Arc::new(client),
            Err(source) => {
                if let Err(e) = handle.close().await {
                    warn!("Failed to close cassette {}: {}", cassette, e);
                }
                return Err(RecorderError::ClientBuild {
                    cassette: cassette.to_string(),
                    source,
                });
            }
        };

        let report = self
            .run(ctx, cassette, &order_by_dependency(&endpoints), client)
            .await;

        handle
            .close()
            .await
            .map_err(|source| RecorderError::Transport {
                cassette: cassette.to_string(),
                source,
            })?;

        info!(
            "Cassette {}: {} recorded, {} skipped, {} failed",
            cassette,
            report.recorded.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    async fn run(
        &self,
        ctx: &CallContext,
        cassette: &str,
        ordered: &[&Endpoint<C>],
        client: Arc<C>,
    ) -> RecordReport {
        let mut report = RecordReport::new(cassette);
        let mut results: HashMap<&str, Value> = HashMap::new();
        let missing = Value::Null;

        for endpoint in ordered {
            let mut args = HandlerArgs::from_params(default_args(&endpoint.params, self.reference));

            if let Some(upstream) = endpoint.depends_on.as_deref() {
                match &endpoint.arg_provider {
                    Some(provider) => {
                        let previous = results.get(upstream).unwrap_or(&missing);
                        match provider(previous) {
                            Some(extra) => args.merge(extra),
                            None => {
                                info!(
                                    "Skipping {}: no usable result from {}",
                                    endpoint.name, upstream
                                );
                                report.skipped.push(endpoint.name.clone());
                                continue;
                            }
                        }
                    }
                    None => warn!(
                        "{} depends on {} but has no arg provider; using defaults",
                        endpoint.name, upstream
                    ),
                }
            }

            debug!("Recording {}", endpoint.name);
            match endpoint.invoke(ctx.clone(), client.clone(), args).await {
                Ok(output) => {
                    let value = output.as_json().cloned().unwrap_or(Value::Null);
                    results.insert(endpoint.name.as_str(), value);
                    report.recorded.push(endpoint.name.clone());
                }
                Err(e) => {
                    warn!("Recording {} failed: {}", endpoint.name, e);
                    report.failed.push(endpoint.name.clone());
                }
            }
        }

        report
    }
}
