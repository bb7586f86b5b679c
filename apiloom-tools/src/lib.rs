//! # Apiloom Tools
//!
//! Projects an [`apiloom::Registry`] onto the Model Context Protocol tool
//! surface. Each eligible endpoint becomes an rmcp [`rmcp::model::Tool`]
//! whose input schema mirrors the endpoint's parameters, and
//! [`ToolSet::call_tool`] dispatches calls to the endpoint handlers.
//!
//! [`ToolServer`] hosts a [`ToolSet`] as an rmcp [`rmcp::ServerHandler`]:
//!
//! ```rust,ignore
//! let tools = ToolGenerator::new(&registry, Arc::new(client)).generate();
//! let service = ToolServer::new("app", "1.0.0", tools)
//!     .serve(rmcp::transport::stdio())
//!     .await?;
//! service.waiting().await?;
//! ```

pub mod generator;
pub mod responses;
pub mod schema;
pub mod server;

pub use generator::{GeneratedTool, ToolGenerator, ToolSet};
pub use server::ToolServer;
pub use responses::{create_error_response, create_success_response};
pub use schema::input_schema;
