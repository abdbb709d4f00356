//! TripMate REST facade entry point.
//!
//! Thin HTTP surface over the session registry, the file-backed stores,
//! and the external agent runtime.

mod api;
mod config;
mod runtime;
mod state;

use std::sync::Arc;

use anyhow::Result;

use tripmate_store::{InMemorySessionStore, ItineraryLog, ProfileStore, SessionStore};

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
    println!("║      TripMate API Server (Trip Planning Assistant)         ║");
    println!("║      With Session-based Conversation Management            ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");

    let cfg = config::ApiConfig::from_env();

    println!("[INIT] Server configuration:");
    println!("  Host:     {}", cfg.host);
    println!("  Port:     {}", cfg.port);
    println!("  Data dir: {}", cfg.data_dir.display());
    match &cfg.runtime_url {
        Some(url) => println!("  Agent runtime: {url}"),
        None => println!("  Agent runtime: not configured (chat will report errors)"),
    }

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let app_state = Arc::new(state::AppState {
        sessions,
        profiles: ProfileStore::new(&cfg.data_dir),
        itineraries: ItineraryLog::new(&cfg.data_dir),
        runtime: runtime::RuntimeClient::new(cfg.runtime_url.clone(), cfg.runtime_timeout),
    });

    let app = api::router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", cfg.host, cfg.port)).await?;

    println!("\n✓ TripMate API Server running on http://{}:{}", cfg.host, cfg.port);
    println!("  GET    /health                       — Check server health");
    println!("  POST   /api/chat                     — Send a message (session-based)");
    println!("  POST   /api/itinerary/create         — Save an itinerary snapshot");
    println!("  GET    /api/itinerary/{{user_id}}      — Fetch the latest itinerary");
    println!("  POST   /api/user/profile             — Create or update a profile");
    println!("  GET    /api/user/profile/{{user_id}}   — Fetch a profile");
    println!("  DELETE /api/session/{{session_id}}     — Delete a session");
    println!("  GET    /api/sessions                 — List active sessions\n");

    axum::serve(listener, app).await?;

    Ok(())
}
