use spotify_mcp::config::Config;
use spotify_mcp::server::SpotifyServer;
use spotify_mcp::spotify::SpotifyClient;
use spotify_mcp::tools::{builtin, ToolRegistry};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Missing credentials stop the process here
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let client = SpotifyClient::new(&config)?;
    let mut registry = ToolRegistry::new();
    builtin::register_all(&mut registry, Arc::new(client));
    info!("Registered {} tools", registry.len());

    let server = SpotifyServer::new(Arc::new(registry));

    info!("Starting MCP server on stdio...");
    let transport = rmcp::transport::io::stdio();
    let service = rmcp::serve_server(server, transport).await?;
    service.waiting().await?;

    info!("MCP client disconnected, shutting down");
    Ok(())
}
