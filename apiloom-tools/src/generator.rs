//! Projection of an endpoint registry onto MCP tools
//!
//! Every endpoint with a tool name and JSON output becomes one [`Tool`].
//! Calls never fail at the protocol level because of bad input or a failing
//! handler: those come back as tool-level error results so the hosting server
//! keeps running. Only an unknown tool name is a protocol error.

use crate::responses::{create_error_response, create_success_response};
use crate::schema::input_schema;
use apiloom::{
    materialize, ArgSource, ArgsError, ArgsResult, CallContext, Endpoint, HandlerArgs,
    HandlerOutput, Param, RawArg, Registry,
};
use rmcp::model::{CallToolResult, JsonObject, Tool};
use rmcp::ErrorData as McpError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds a [`ToolSet`] from a registry and a live client
pub struct ToolGenerator<'a, C> {
    registry: &'a Registry<C>,
    client: Arc<C>,
}

impl<'a, C> ToolGenerator<'a, C> {
    pub fn new(registry: &'a Registry<C>, client: Arc<C>) -> Self {
        Self { registry, client }
    }

    /// Generate one tool per eligible endpoint, in registration order
    ///
    /// Endpoints without a tool name are skipped, and so are raw-output
    /// endpoints since binary payloads have no tool representation.
    pub fn generate(&self) -> ToolSet<C> {
        let mut tools = Vec::new();
        let mut index = HashMap::new();

        for endpoint in self.registry.all() {
            let Some(tool_name) = endpoint.tool_name.as_deref() else {
                continue;
            };
            if endpoint.raw_output {
                debug!("Skipping raw-output endpoint {} for tools", endpoint.name);
                continue;
            }
            if index.contains_key(tool_name) {
                warn!(
                    "Tool name {} is already used; skipping endpoint {}",
                    tool_name, endpoint.name
                );
                continue;
            }

            index.insert(tool_name.to_string(), tools.len());
            tools.push(GeneratedTool::new(tool_name, endpoint.clone()));
        }

        debug!("Generated {} tools", tools.len());
        ToolSet {
            client: self.client.clone(),
            tools,
            index,
        }
    }
}

/// One generated tool bound to its endpoint
pub struct GeneratedTool<C> {
    tool: Tool,
    endpoint: Endpoint<C>,
}

impl<C> GeneratedTool<C> {
    fn new(tool_name: &str, endpoint: Endpoint<C>) -> Self {
        let description = if endpoint.long.trim().is_empty() {
            endpoint.short.clone()
        } else {
            endpoint.long.clone()
        };
        let tool = Tool::new(
            tool_name.to_string(),
            description,
            Arc::new(input_schema(&endpoint)),
        );
        Self { tool, endpoint }
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }

    pub fn endpoint(&self) -> &Endpoint<C> {
        &self.endpoint
    }

    /// Turn tool-call arguments into handler arguments
    pub fn parse_arguments(&self, arguments: &JsonObject) -> ArgsResult<HandlerArgs> {
        let params = materialize(&self.endpoint.params, &mut JsonArgSource { arguments })?;
        let mut args = HandlerArgs::from_params(params);

        if let Some(body) = &self.endpoint.body {
            let property = body.property_name();
            let payload = match arguments.get(&property) {
                Some(Value::String(text)) => text.clone().into_bytes(),
                Some(Value::Null) | None => return Err(ArgsError::MissingBody { property }),
                Some(inline) => inline.to_string().into_bytes(),
            };
            args = args.with_body(body.decode(&payload)?);
        }

        Ok(args)
    }

    /// Execute the tool, reporting every failure as a tool-level error
    pub async fn call(
        &self,
        ctx: CallContext,
        client: Arc<C>,
        arguments: &JsonObject,
    ) -> CallToolResult {
        debug!("Calling tool {} ({})", self.name(), self.endpoint.name);

        let args = match self.parse_arguments(arguments) {
            Ok(args) => args,
            Err(e) => {
                debug!("Rejected arguments for tool {}: {}", self.name(), e);
                return create_error_response(e.to_string());
            }
        };

        match self.endpoint.invoke(ctx, client, args).await {
            Ok(HandlerOutput::Json(value)) => match serde_json::to_string_pretty(&value) {
                Ok(text) => create_success_response(text),
                Err(e) => create_error_response(format!("failed to encode result: {e}")),
            },
            Ok(HandlerOutput::Raw(_)) => create_error_response(format!(
                "{} returned binary output, which tools cannot carry",
                self.endpoint.name
            )),
            Err(e) => {
                warn!("Tool {} failed: {}", self.name(), e);
                create_error_response(e.to_string())
            }
        }
    }
}

/// The generated tools plus the client they call through
pub struct ToolSet<C> {
    client: Arc<C>,
    tools: Vec<GeneratedTool<C>>,
    index: HashMap<String, usize>,
}

impl<C> ToolSet<C> {
    /// Tool definitions for an MCP `list_tools` response
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&GeneratedTool<C>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch an MCP `call_tool` request
    pub async fn call_tool(
        &self,
        ctx: CallContext,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::invalid_request(format!("Unknown tool: {name}"), None))?;
        let arguments = arguments.unwrap_or_default();
        Ok(tool.call(ctx, self.client.clone(), &arguments).await)
    }
}

/// Tool schemas type integers as `number`, so `7.0` must read as 7
fn is_whole_i64(value: f64) -> bool {
    value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
}

/// Reads parameter values from tool-call arguments
struct JsonArgSource<'a> {
    arguments: &'a JsonObject,
}

impl ArgSource for JsonArgSource<'_> {
    fn value(&mut self, param: &Param) -> Option<RawArg> {
        match self.arguments.get(&param.name)? {
            Value::Null => None,
            Value::String(text) => Some(RawArg::Text(text.clone())),
            Value::Bool(value) => Some(RawArg::Bool(*value)),
            Value::Number(number) => Some(match number.as_i64() {
                Some(value) => RawArg::Int(value),
                None => match number.as_f64() {
                    Some(value) if is_whole_i64(value) => RawArg::Int(value as i64),
                    _ => RawArg::Text(number.to_string()),
                },
            }),
            other => Some(RawArg::Text(other.to_string())),
        }
    }

    fn range_bound(&mut self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
