//! MCP server hosting a generated [`ToolSet`]
//!
//! The server answers `list_tools` and `call_tool` and nothing else. Each
//! call gets a [`CallContext`] bound to the request's cancellation token, so
//! a client cancelling a request reaches the endpoint handler.

use crate::generator::ToolSet;
use apiloom::{CallContext, Surface};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;
use tracing::debug;

/// Serves generated tools to MCP clients
pub struct ToolServer<C> {
    tools: Arc<ToolSet<C>>,
    name: String,
    version: String,
    instructions: Option<String>,
}

impl<C> ToolServer<C> {
    /// Serve `tools` under the given server name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>, tools: ToolSet<C>) -> Self {
        Self {
            tools: Arc::new(tools),
            name: name.into(),
            version: version.into(),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn tools(&self) -> &ToolSet<C> {
        &self.tools
    }
}

impl<C> Clone for ToolServer<C> {
    fn clone(&self) -> Self {
        Self {
            tools: self.tools.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            instructions: self.instructions.clone(),
        }
    }
}

fn server_implementation(name: &str, version: &str) -> Implementation {
    let mut implementation = Implementation::from_build_env();
    implementation.name = name.to_string();
    implementation.version = version.to_string();
    implementation
}

impl<C: Send + Sync + 'static> ServerHandler for ToolServer<C> {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = server_implementation(&self.name, &self.version);
        info.instructions = self.instructions.clone();
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut result = ListToolsResult::default();
        result.tools = self.tools.list_tools();
        Ok(result)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!("call_tool invoked for tool: {}", request.name);
        let ctx = CallContext::with_cancellation(Surface::Tool, context.ct.clone());
        self.tools
            .call_tool(ctx, &request.name, request.arguments)
            .await
    }
}
