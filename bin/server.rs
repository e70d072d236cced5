// Contract Collection - API Server
// REST surface over the Entity Store, with Axum

use anyhow::{Context, Result};
use contract_collection::server::{build_router, AppState};
use contract_collection::{init_tracing, Config, SqliteStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    println!("🌐 Contract Collection - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    println!("✓ Database opened: {:?}", config.db_path);

    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/all", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!("shutdown requested");
}
