//! MCP boundary: publishes the tool registry over rmcp and renders every
//! outcome to a single text block.

use crate::tools::executor::ToolExecutor;
use crate::tools::ToolRegistry;
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData, ServerHandler,
};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct SpotifyServer {
    executor: Arc<ToolExecutor>,
}

impl SpotifyServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            executor: Arc::new(ToolExecutor::new(registry)),
        }
    }

    pub fn mcp_tools(&self) -> Vec<rmcp::model::Tool> {
        self.executor
            .registry()
            .list_tools()
            .iter()
            .map(|tool| {
                let schema = match tool.parameters_schema() {
                    Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                rmcp::model::Tool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema),
                )
            })
            .collect()
    }

    /// Runs a call and wraps the rendered text. Only dispatch rejections
    /// (unknown tool, bad arguments) become protocol errors.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let params = arguments.map(Value::Object).unwrap_or_else(|| Value::Object(JsonObject::new()));
        match self.executor.execute(name, params).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Err(ErrorData::invalid_params(e.to_string(), None)),
        }
    }
}

impl ServerHandler for SpotifyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "spotify-mcp".into(),
                title: Some("Spotify control".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Controla la reproducción de Spotify del usuario: buscar y reproducir música, \
                 manejar la cola, dispositivos, playlists y recomendaciones."
                    .into(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.mcp_tools(),
            next_cursor: None,
            meta: None,
        }))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move { self.dispatch(&request.name, request.arguments).await }
    }
}
