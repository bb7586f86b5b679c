//! Commands of the demo binary that are not generated from endpoints

use crate::training::TrainingLog;
use anyhow::{anyhow, Context, Result};
use apiloom::{validate, CallContext, Registry, Surface};
use apiloom_cli::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};
use apiloom_config::LoomConfig;
use apiloom_recorder::{Cassette, CassetteFactory, Recorder, Session};
use apiloom_tools::{ToolGenerator, ToolServer};
use async_trait::async_trait;
use rmcp::model::{CallToolResult, RawContent};
use rmcp::ServiceExt;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Print linter findings; warns when there are any
pub fn lint<W: Write>(registry: &Registry<TrainingLog>, dir: &Path, out: &mut W) -> Result<i32> {
    let findings = validate(registry, dir);
    if findings.is_empty() {
        writeln!(out, "No issues found in {} endpoints", registry.len())?;
        return Ok(EXIT_SUCCESS);
    }

    for finding in &findings {
        writeln!(out, "{finding}")?;
    }
    writeln!(out, "{} issues found", findings.len())?;
    Ok(EXIT_WARNING)
}

/// Print the generated tool definitions
pub fn tools<W: Write>(
    registry: &Registry<TrainingLog>,
    client: Arc<TrainingLog>,
    out: &mut W,
) -> Result<i32> {
    let tools = ToolGenerator::new(registry, client).generate();
    let definitions = serde_json::to_string_pretty(&tools.list_tools())?;
    writeln!(out, "{definitions}")?;
    Ok(EXIT_SUCCESS)
}

/// Call one generated tool with JSON object arguments
pub async fn call<W: Write>(
    registry: &Registry<TrainingLog>,
    client: Arc<TrainingLog>,
    tool: &str,
    arguments: Option<&str>,
    out: &mut W,
) -> Result<i32> {
    let arguments = match arguments {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("invalid --args")? {
            Value::Object(map) => Some(map),
            _ => return Err(anyhow!("--args must be a JSON object")),
        },
        None => None,
    };

    let tools = ToolGenerator::new(registry, client).generate();
    let result = tools
        .call_tool(CallContext::new(Surface::Tool), tool, arguments)
        .await
        .map_err(|e| anyhow!("{}", e.message))?;

    for text in content_text(&result) {
        writeln!(out, "{text}")?;
    }
    Ok(if result.is_error == Some(true) {
        EXIT_WARNING
    } else {
        EXIT_SUCCESS
    })
}

/// Serve the generated tools over stdio until the client disconnects
pub async fn serve(registry: &Registry<TrainingLog>, client: Arc<TrainingLog>) -> Result<i32> {
    let tools = ToolGenerator::new(registry, client).generate();
    info!("Serving {} tools over stdio", tools.len());

    let service = ToolServer::new("apiloom-demo", env!("CARGO_PKG_VERSION"), tools)
        .with_instructions("Training log tools. Dates are written as YYYY-MM-DD.")
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start the MCP server")?;
    let reason = service.waiting().await.context("MCP server task failed")?;

    info!("MCP server stopped: {:?}", reason);
    Ok(EXIT_SUCCESS)
}

/// Replay every endpoint without a live transport
///
/// Failing endpoints are listed in the printed reports and do not fail the
/// command.
pub async fn record<W: Write>(
    registry: &Registry<TrainingLog>,
    config: &LoomConfig,
    cassette: Option<&str>,
    out: &mut W,
) -> Result<i32> {
    let factory = DryRunFactory {
        cassette_dir: config.cassette_dir.display().to_string(),
    };
    let recorder = Recorder::new(registry, factory, |_http: DryRunHttp, _session: &Session| {
        Ok(TrainingLog::seeded())
    })
    .with_config(config)?;

    let ctx = CallContext::new(Surface::Recorder);
    let reports = match cassette {
        Some(cassette) => vec![recorder.record_cassette(&ctx, cassette).await?],
        None => recorder.record_all(&ctx).await?,
    };

    writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
    Ok(EXIT_SUCCESS)
}

/// Stands in for a record/replay HTTP transport
struct DryRunFactory {
    cassette_dir: String,
}

/// The in-memory client needs no HTTP client
struct DryRunHttp;

struct DryRunCassette {
    path: String,
}

#[async_trait]
impl CassetteFactory for DryRunFactory {
    type Http = DryRunHttp;
    type Cassette = DryRunCassette;

    async fn open(&self, cassette: &str) -> Result<DryRunCassette> {
        let path = format!("{}/{cassette}.yaml", self.cassette_dir);
        info!("Dry run: traffic would be recorded to {}", path);
        Ok(DryRunCassette { path })
    }
}

#[async_trait]
impl Cassette for DryRunCassette {
    type Http = DryRunHttp;

    fn http_client(&self) -> DryRunHttp {
        DryRunHttp
    }

    async fn close(&mut self) -> Result<()> {
        info!("Dry run: closed {}", self.path);
        Ok(())
    }
}

/// Text blocks of a tool result
fn content_text(result: &CallToolResult) -> Vec<&str> {
    result
        .content
        .iter()
        .filter_map(|content| match &content.raw {
            RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect()
}
