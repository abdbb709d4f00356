//! TripMate tool server entry point.

use std::sync::Arc;

use anyhow::Result;

use tripmate_mcp_server::tools::ToolState;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║        TripMate Tool Server (Pricing & Booking Mock)       ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");

    let port = std::env::var("TOOLS_PORT")
        .unwrap_or_else(|_| "8001".to_string())
        .parse::<u16>()
        .unwrap_or(8001);
    let data_dir = std::env::var("TRIPMATE_DATA_DIR").unwrap_or_else(|_| "data".to_string());

    println!("[INIT] Server configuration:");
    println!("  Port:     {}", port);
    println!("  Data dir: {}", data_dir);

    let state = Arc::new(ToolState::new(&data_dir));
    let app = tripmate_mcp_server::router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    println!("\n✓ TripMate Tool Server running on http://0.0.0.0:{port}");
    println!("  GET  /tools          — List all tools");
    println!("  POST /tools/{{name}}   — Invoke a tool\n");

    axum::serve(listener, app).await?;

    Ok(())
}
